//! Bookkeeping for open table handles.

use crate::storage_trait::{Result, StoreError, TableHandle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks which handles a store has given out and not yet taken back.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: AtomicU64,
    open: Mutex<HashMap<u64, String>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, table: &str) -> TableHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.open.lock().insert(id, table.to_string());
        TableHandle::new(id, table)
    }

    pub fn close(&self, handle: TableHandle) {
        if self.open.lock().remove(&handle.id()).is_none() {
            log::warn!("Closing unknown table handle {}", handle);
        }
    }

    /// Fails unless the handle is currently open.
    pub fn check(&self, handle: &TableHandle) -> Result<()> {
        match self.open.lock().get(&handle.id()) {
            Some(table) if table == handle.table() => Ok(()),
            _ => Err(StoreError::InvalidInput(format!(
                "table handle {} is not open",
                handle
            ))),
        }
    }

    /// Number of handles not yet closed.
    pub fn open_count(&self) -> usize {
        self.open.lock().len()
    }
}
