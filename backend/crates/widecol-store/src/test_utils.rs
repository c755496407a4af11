//! Test utilities for widecol-store.
//!
//! Provides a RocksDB store in a temporary directory and a recording store
//! that captures every call the core makes and can inject failures.

use crate::cells::RawRow;
use crate::memory_impl::InMemoryStore;
use crate::rocksdb_impl::RocksDbStore;
use crate::rocksdb_init::RocksDbInit;
use crate::scan::{ScanDescriptor, ScanDirection};
use crate::storage_trait::{
    RawRowIter, Result, StoreClient, StoreError, TableDescriptor, TableHandle,
};
use crate::Projection;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// RocksDB store that cleans up its directory on drop.
pub struct TestDb {
    pub store: RocksDbStore,
    // Kept alive for the lifetime of the store
    #[allow(dead_code)]
    temp_dir: TempDir,
}

impl TestDb {
    /// Opens an empty RocksDB store in a fresh temporary directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use widecol_store::test_utils::TestDb;
    ///
    /// let test_db = TestDb::new().unwrap();
    /// // Use test_db.store for testing...
    /// ```
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let db = RocksDbInit::with_defaults(temp_dir.path().to_string_lossy()).open()?;
        Ok(Self {
            store: RocksDbStore::new(db),
            temp_dir,
        })
    }

    /// Opens a store with the given tables already created.
    pub fn with_tables(tables: &[TableDescriptor]) -> anyhow::Result<Self> {
        let test_db = Self::new()?;
        for table in tables {
            test_db.store.create_table(table)?;
        }
        Ok(test_db)
    }
}

/// One scan call as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub table: String,
    pub start_row: Option<Vec<u8>>,
    pub stop_row: Option<Vec<u8>>,
    pub has_predicate: bool,
    /// Row limit the predicate imposes, if any.
    pub predicate_row_limit: Option<usize>,
    pub projection: Option<Projection>,
    pub limit: usize,
    pub direction: ScanDirection,
}

impl ScanRecord {
    fn from_descriptor(table: &str, descriptor: &ScanDescriptor) -> Self {
        Self {
            table: table.to_string(),
            start_row: descriptor.start_row.clone(),
            stop_row: descriptor.stop_row.clone(),
            has_predicate: descriptor.predicate.is_some(),
            predicate_row_limit: descriptor.predicate.as_ref().and_then(|p| p.row_limit()),
            projection: descriptor.projection.clone(),
            limit: descriptor.limit,
            direction: descriptor.direction,
        }
    }
}

/// One put call as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecord {
    pub table: String,
    pub key: Vec<u8>,
    pub family: String,
    pub cells: BTreeMap<Vec<u8>, Vec<u8>>,
}

#[derive(Debug, Default)]
struct Faults {
    fail_open: bool,
    fail_scans: bool,
    fail_puts_after: Option<usize>,
    fail_scan_after_rows: Option<usize>,
}

/// StoreClient wrapper over [`InMemoryStore`] that records calls.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    scans: Mutex<Vec<ScanRecord>>,
    puts: Mutex<Vec<PutRecord>>,
    open_calls: AtomicUsize,
    close_calls: AtomicUsize,
    faults: Mutex<Faults>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store, for seeding data without recording.
    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn last_scan(&self) -> Option<ScanRecord> {
        self.scans.lock().last().cloned()
    }

    pub fn scans(&self) -> Vec<ScanRecord> {
        self.scans.lock().clone()
    }

    pub fn puts(&self) -> Vec<PutRecord> {
        self.puts.lock().clone()
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Handles opened and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.inner.open_handles()
    }

    /// Makes every `open_table` fail with `Unavailable`.
    pub fn fail_open(&self, fail: bool) {
        self.faults.lock().fail_open = fail;
    }

    /// Makes every `scan` fail with `Unavailable` before returning rows.
    pub fn fail_scans(&self, fail: bool) {
        self.faults.lock().fail_scans = fail;
    }

    /// Lets `n` more puts through, then fails every following put with `Io`.
    pub fn fail_puts_after(&self, n: usize) {
        self.faults.lock().fail_puts_after = Some(n);
    }

    /// Scans yield `rows` rows, then an `Io` error.
    pub fn fail_scan_after_rows(&self, rows: usize) {
        self.faults.lock().fail_scan_after_rows = Some(rows);
    }
}

impl StoreClient for RecordingStore {
    fn open_table(&self, name: &str) -> Result<TableHandle> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.lock().fail_open {
            return Err(StoreError::Unavailable("injected open failure".into()));
        }
        self.inner.open_table(name)
    }

    fn close_table(&self, handle: TableHandle) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.close_table(handle)
    }

    fn scan(&self, handle: &TableHandle, descriptor: &ScanDescriptor) -> Result<RawRowIter<'_>> {
        self.scans
            .lock()
            .push(ScanRecord::from_descriptor(handle.table(), descriptor));

        let (fail_scans, fail_after) = {
            let faults = self.faults.lock();
            (faults.fail_scans, faults.fail_scan_after_rows)
        };
        if fail_scans {
            return Err(StoreError::Unavailable("injected scan failure".into()));
        }

        let rows = self.inner.scan(handle, descriptor)?;
        match fail_after {
            Some(n) => {
                let failure: Result<RawRow> = Err(StoreError::Io("injected mid-scan failure".into()));
                Ok(Box::new(rows.take(n).chain(std::iter::once(failure))))
            }
            None => Ok(rows),
        }
    }

    fn put(
        &self,
        handle: &TableHandle,
        key: &[u8],
        family: &str,
        cells: &BTreeMap<Vec<u8>, Vec<u8>>,
    ) -> Result<()> {
        self.puts.lock().push(PutRecord {
            table: handle.table().to_string(),
            key: key.to_vec(),
            family: family.to_string(),
            cells: cells.clone(),
        });

        {
            let mut faults = self.faults.lock();
            match faults.fail_puts_after.as_mut() {
                Some(0) => return Err(StoreError::Io("injected put failure".into())),
                Some(left) => *left -= 1,
                None => {}
            }
        }

        self.inner.put(handle, key, family, cells)
    }

    fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        self.inner.create_table(descriptor)
    }

    fn table_exists(&self, name: &str) -> bool {
        self.inner.table_exists(name)
    }
}
