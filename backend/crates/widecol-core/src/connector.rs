//! Connector operations: select, scan_table and upsert.

use crate::error::Result;
use crate::materializer::materialize;
use crate::mutation::{MutationBatch, RowUpdates};
use crate::planner::{plan, SelectRequest};
use std::sync::Arc;
use widecol_commons::Row;
use widecol_store::{StoreClient, TableHandle};

/// Table handle that is returned to the store when dropped.
pub struct ScopedTable<'a> {
    client: &'a dyn StoreClient,
    handle: TableHandle,
}

impl<'a> ScopedTable<'a> {
    pub fn open(client: &'a dyn StoreClient, table: &str) -> Result<Self> {
        let handle = client.open_table(table)?;
        Ok(Self { client, handle })
    }

    pub fn handle(&self) -> &TableHandle {
        &self.handle
    }
}

impl Drop for ScopedTable<'_> {
    fn drop(&mut self) {
        let handle = std::mem::replace(&mut self.handle, TableHandle::new(0, String::new()));
        self.client.close_table(handle);
    }
}

/// Entry point for reading and writing a wide-column store.
#[derive(Clone)]
pub struct WideColumnConnector {
    client: Arc<dyn StoreClient>,
}

impl WideColumnConnector {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn StoreClient> {
        &self.client
    }

    /// Runs a selection and returns the flattened rows.
    pub fn select(&self, request: &SelectRequest) -> Result<Vec<Row>> {
        let descriptor = plan(request)?;

        let table = ScopedTable::open(self.client.as_ref(), &request.table)?;
        let rows = self.client.scan(table.handle(), &descriptor)?;
        let rows = materialize(rows, descriptor.limit, descriptor.direction)?;

        log::debug!("Selected {} rows from table {}", rows.len(), request.table);
        Ok(rows)
    }

    /// Returns every row of a table.
    pub fn scan_table(&self, table: &str) -> Result<Vec<Row>> {
        self.select(&SelectRequest::new(table))
    }

    /// Writes `updates` under one column family, one put per row.
    pub fn upsert(&self, table: &str, family: &str, updates: &RowUpdates) -> Result<()> {
        let batch = MutationBatch::build(table, family, updates)?;
        if batch.is_empty() {
            log::info!("Writing 0 rows to table {}", table);
            return Ok(());
        }

        let scoped = ScopedTable::open(self.client.as_ref(), table)?;
        batch.apply(self.client.as_ref(), scoped.handle())
    }
}

impl std::fmt::Debug for WideColumnConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WideColumnConnector").finish_non_exhaustive()
    }
}

impl From<Arc<dyn StoreClient>> for WideColumnConnector {
    fn from(client: Arc<dyn StoreClient>) -> Self {
        Self::new(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConnectorError, ErrorKind};
    use widecol_store::test_utils::RecordingStore;
    use widecol_store::{StoreError, TableDescriptor};

    fn recording_store() -> Arc<RecordingStore> {
        let store = Arc::new(RecordingStore::new());
        store
            .create_table(&TableDescriptor::new("t").with_family("info"))
            .unwrap();
        store
    }

    #[test]
    fn test_scoped_table_closes_on_drop() {
        let store = recording_store();
        {
            let scoped = ScopedTable::open(store.as_ref(), "t").unwrap();
            assert_eq!(scoped.handle().table(), "t");
            assert_eq!(store.open_handles(), 1);
        }
        assert_eq!(store.open_handles(), 0);
        assert_eq!(store.close_calls(), 1);
    }

    #[test]
    fn test_open_failure_has_nothing_to_close() {
        let store = recording_store();
        store.fail_open(true);
        let err = ScopedTable::open(store.as_ref(), "t").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert_eq!(store.close_calls(), 0);
    }

    #[test]
    fn test_select_unknown_table() {
        let store = recording_store();
        let connector = WideColumnConnector::new(store.clone());
        let err = connector.scan_table("missing").unwrap_err();
        assert_eq!(err, ConnectorError::Store(StoreError::TableNotFound("missing".into())));
        assert!(store.scans().is_empty());
    }

    #[test]
    fn test_empty_upsert_skips_store() {
        let store = recording_store();
        let connector = WideColumnConnector::new(store.clone());
        connector.upsert("t", "info", &RowUpdates::new()).unwrap();
        assert_eq!(store.open_calls(), 0);
        assert!(store.puts().is_empty());
    }
}
