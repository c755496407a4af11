//! # widecol-core
//!
//! Read and write operations over a wide-column store.
//!
//! ```text
//! select:  SelectRequest → planner → StoreClient::scan → materializer → Vec<Row>
//! upsert:  RowUpdates → MutationBatch → StoreClient::put (one per row)
//! ```
//!
//! The core holds no state between calls. Every operation opens a scoped
//! table handle that is returned to the store on all exit paths.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use widecol_core::{SelectRequest, WideColumnConnector};
//! use widecol_store::{InMemoryStore, StoreClient, TableDescriptor};
//!
//! let store = Arc::new(InMemoryStore::new());
//! store.create_table(&TableDescriptor::new("users").with_family("info")).unwrap();
//!
//! let connector = WideColumnConnector::new(store);
//! let mut updates = HashMap::new();
//! updates.insert(
//!     "r1".to_string(),
//!     HashMap::from([("name".to_string(), Some("jorge".to_string()))]),
//! );
//! connector.upsert("users", "info", &updates).unwrap();
//!
//! let rows = connector.select(&SelectRequest::new("users").with_limit(10)).unwrap();
//! assert_eq!(rows[0].value("info", "name"), Some("jorge"));
//! ```

pub mod connector;
pub mod error;
pub mod materializer;
pub mod mutation;
pub mod planner;

pub use connector::{ScopedTable, WideColumnConnector};
pub use error::{ConnectorError, ErrorKind, Result};
pub use mutation::{MutationBatch, RowMutation, RowUpdates};
pub use planner::{plan, SelectRequest};
