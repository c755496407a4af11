//! # widecol-store
//!
//! Wide-column store abstraction used by the connector core.
//! This crate isolates every interaction with a concrete store, so
//! widecol-core only ever sees the [`StoreClient`] trait.
//!
//! ## Architecture
//!
//! ```text
//! widecol-core (planning, materialization, mutation batching)
//!     ↓
//! widecol-store (StoreClient: open/scan/put/close)
//!     ↓
//! RocksDB | in-memory
//! ```

pub mod cells;
pub mod handles;
pub mod memory_impl;
pub mod predicate;
pub mod projection;
pub mod rocksdb_impl;
pub mod rocksdb_init;
pub mod scan;
pub mod storage_trait;

pub use cells::{FamilyCells, RawRow};
pub use memory_impl::InMemoryStore;
pub use predicate::{PageFilter, Predicate, PredicateList, PrefixFilter, SingleColumnValueFilter};
pub use projection::Projection;
pub use rocksdb_impl::RocksDbStore;
pub use rocksdb_init::RocksDbInit;
pub use scan::{ScanCursor, ScanDescriptor, ScanDirection};
pub use storage_trait::{RawRowIter, StoreClient, StoreError, TableDescriptor, TableHandle};

// Make test_utils available for testing in dependent crates
pub mod test_utils;
