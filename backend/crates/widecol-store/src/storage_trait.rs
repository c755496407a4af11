//! Store client abstraction for pluggable wide-column stores.
//!
//! The core never talks to a concrete store. It drives a [`StoreClient`],
//! which exposes the small surface a wide-column store offers:
//! - open/close a table handle
//! - forward range scans described by a [`ScanDescriptor`]
//! - per-row puts into one column family
//! - table creation (admin)
//!
//! ## Data Model
//!
//! ```text
//! table → row key → column family → qualifier → timestamp (asc) → value
//! ```
//!
//! Rows come back as [`RawRow`]s, with every retained version of every cell.
//! Stores always iterate forward in ascending row key order; reverse scans are
//! emulated by the caller.
//!
//! ## Implementing a Custom Store
//!
//! ```rust,ignore
//! use widecol_store::storage_trait::{StoreClient, TableHandle, Result};
//!
//! pub struct MyStore {
//!     // connection state
//! }
//!
//! impl StoreClient for MyStore {
//!     fn open_table(&self, name: &str) -> Result<TableHandle> {
//!         todo!()
//!     }
//!
//!     // ... implement other required methods
//! }
//! ```

use crate::cells::RawRow;
use crate::scan::ScanDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use widecol_commons::constants::DEFAULT_MAX_VERSIONS;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Iterator over scanned rows. Errors may surface mid-stream.
pub type RawRowIter<'a> = Box<dyn Iterator<Item = Result<RawRow>> + 'a>;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Table does not exist
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Table already exists with a different schema
    #[error("Table already exists: {0}")]
    TableExists(String),

    /// Column family is not part of the table schema
    #[error("Column family '{family}' not found in table '{table}'")]
    FamilyNotFound { table: String, family: String },

    /// Store cannot be reached or refused the connection
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Generic I/O error from underlying storage
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Request rejected by the store (bad handle, empty row key, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Whether the error means the store could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Opaque token for an open table.
///
/// Handles are not `Clone`: each one is returned to the store exactly once
/// through [`StoreClient::close_table`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TableHandle {
    id: u64,
    table: String,
}

impl TableHandle {
    pub fn new(id: u64, table: impl Into<String>) -> Self {
        Self {
            id,
            table: table.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.table, self.id)
    }
}

/// Schema of a table: its column families and version retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    name: String,
    families: BTreeSet<String>,
    max_versions: u32,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            families: BTreeSet::new(),
            max_versions: DEFAULT_MAX_VERSIONS,
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.families.insert(family.into());
        self
    }

    /// Number of versions kept per cell. Values below 1 are raised to 1.
    pub fn with_max_versions(mut self, max_versions: u32) -> Self {
        self.max_versions = max_versions.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn families(&self) -> &BTreeSet<String> {
        &self.families
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.contains(family)
    }

    pub fn max_versions(&self) -> u32 {
        self.max_versions
    }

    /// Checks the descriptor can be created.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(StoreError::InvalidInput("table name cannot be empty".into()));
        }
        if self.families.is_empty() {
            return Err(StoreError::InvalidInput(format!(
                "table '{}' needs at least one column family",
                self.name
            )));
        }
        if self.families.iter().any(|f| f.is_empty()) {
            return Err(StoreError::InvalidInput(format!(
                "table '{}' has an empty column family name",
                self.name
            )));
        }
        Ok(())
    }
}

/// Trait for wide-column store clients.
///
/// Implementations must be thread-safe (Send + Sync); the core shares one
/// client between concurrent callers.
///
/// ## Error Handling
///
/// Implementations should:
/// - Return `TableNotFound` when opening an unknown table
/// - Return `FamilyNotFound` when writing to a family outside the schema
/// - Return `Unavailable`/`Io` for connection and storage failures
pub trait StoreClient: Send + Sync {
    /// Opens a handle to an existing table.
    fn open_table(&self, name: &str) -> Result<TableHandle>;

    /// Releases a handle. Closing never fails.
    fn close_table(&self, handle: TableHandle);

    /// Runs a forward range scan.
    ///
    /// Rows are returned in ascending key order within
    /// `[start_row, stop_row)`, restricted to the projection, filtered by the
    /// predicate and cut off after the predicate's row limit. `limit` and
    /// `direction` of the descriptor are not interpreted by the store.
    fn scan(&self, handle: &TableHandle, descriptor: &ScanDescriptor) -> Result<RawRowIter<'_>>;

    /// Writes the given qualifiers of one row under one family, as a new
    /// version stamped by the store.
    fn put(
        &self,
        handle: &TableHandle,
        key: &[u8],
        family: &str,
        cells: &BTreeMap<Vec<u8>, Vec<u8>>,
    ) -> Result<()>;

    /// Creates a table. Succeeds if an identical table already exists.
    fn create_table(&self, descriptor: &TableDescriptor) -> Result<()>;

    /// Checks if a table exists.
    fn table_exists(&self, name: &str) -> bool;
}
