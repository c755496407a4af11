//! RocksDB implementation of the StoreClient trait.
//!
//! Maps each table to a RocksDB column family (`t:{table}`). The RocksDB key
//! is the row key, so RocksDB's own ordering gives ascending row order. The
//! value is the bincode-encoded [`FamilyCells`] of the row, versions included.
//! Table descriptors are kept in the catalog column family.

use crate::cells::{apply_put, decode_row, encode_row, FamilyCells, RawRow, TimestampOracle};
use crate::handles::HandleRegistry;
use crate::rocksdb_init::{table_cf_options, RocksDb};
use crate::scan::{ScanCursor, ScanDescriptor};
use crate::storage_trait::{
    RawRowIter, Result, StoreClient, StoreError, TableDescriptor, TableHandle,
};
use parking_lot::{Mutex, RwLock};
use rocksdb::{BoundColumnFamily, Direction, IteratorMode, ReadOptions};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use widecol_commons::constants::TABLE_CATALOG_PARTITION;
use widecol_configs::RocksDbSettings;

/// RocksDB-backed store.
///
/// ## Example
///
/// ```rust,ignore
/// use widecol_store::{RocksDbInit, RocksDbStore, StoreClient, TableDescriptor};
///
/// let db = RocksDbInit::with_defaults("/tmp/widecol").open().unwrap();
/// let store = RocksDbStore::new(db);
/// store.create_table(&TableDescriptor::new("users").with_family("info")).unwrap();
/// ```
pub struct RocksDbStore {
    db: Arc<RocksDb>,
    settings: RocksDbSettings,
    clock: TimestampOracle,
    handles: HandleRegistry,
    descriptors: RwLock<HashMap<String, TableDescriptor>>,
    // Serializes read-modify-write of rows
    write_lock: Mutex<()>,
}

impl RocksDbStore {
    /// Creates a store over an opened database with default table options.
    pub fn new(db: Arc<RocksDb>) -> Self {
        Self::with_settings(db, RocksDbSettings::default())
    }

    pub fn with_settings(db: Arc<RocksDb>, settings: RocksDbSettings) -> Self {
        Self {
            db,
            settings,
            clock: TimestampOracle::new(),
            handles: HandleRegistry::new(),
            descriptors: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns a reference to the underlying database.
    pub fn db(&self) -> &Arc<RocksDb> {
        &self.db
    }

    /// Number of table handles currently open.
    pub fn open_handles(&self) -> usize {
        self.handles.open_count()
    }

    fn cf_name(table: &str) -> String {
        format!("t:{}", table)
    }

    fn table_cf(&self, table: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(&Self::cf_name(table))
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    fn catalog_cf(&self) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(TABLE_CATALOG_PARTITION)
            .ok_or_else(|| StoreError::Unavailable("table catalog is missing".into()))
    }

    /// Loads a table descriptor, from cache or from the catalog.
    fn descriptor(&self, table: &str) -> Result<Option<TableDescriptor>> {
        if let Some(desc) = self.descriptors.read().get(table) {
            return Ok(Some(desc.clone()));
        }

        let catalog = self.catalog_cf()?;
        let Some(bytes) = self
            .db
            .get_cf(&catalog, table.as_bytes())
            .map_err(|e| StoreError::Io(e.to_string()))?
        else {
            return Ok(None);
        };
        let (desc, _): (TableDescriptor, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.descriptors
            .write()
            .insert(table.to_string(), desc.clone());
        Ok(Some(desc))
    }
}

impl StoreClient for RocksDbStore {
    fn open_table(&self, name: &str) -> Result<TableHandle> {
        if self.descriptor(name)?.is_none() {
            return Err(StoreError::TableNotFound(name.to_string()));
        }
        Ok(self.handles.open(name))
    }

    fn close_table(&self, handle: TableHandle) {
        self.handles.close(handle);
    }

    fn scan(&self, handle: &TableHandle, descriptor: &ScanDescriptor) -> Result<RawRowIter<'_>> {
        self.handles.check(handle)?;
        if descriptor.is_empty_range() {
            return Ok(Box::new(std::iter::empty()));
        }

        let cf = self.table_cf(handle.table())?;

        let mut readopts = ReadOptions::default();
        if let Some(stop) = &descriptor.stop_row {
            readopts.set_iterate_upper_bound(stop.clone());
        }
        let mode = match &descriptor.start_row {
            Some(start) => IteratorMode::From(start.as_slice(), Direction::Forward),
            None => IteratorMode::Start,
        };

        let rows = self
            .db
            .iterator_cf_opt(&cf, readopts, mode)
            .map(|item| -> Result<RawRow> {
                let (key, value) = item.map_err(|e| StoreError::Io(e.to_string()))?;
                let families = decode_row(&value)?;
                Ok(RawRow::with_families(key.to_vec(), families))
            });

        Ok(Box::new(ScanCursor::new(rows, descriptor)))
    }

    fn put(
        &self,
        handle: &TableHandle,
        key: &[u8],
        family: &str,
        cells: &BTreeMap<Vec<u8>, Vec<u8>>,
    ) -> Result<()> {
        self.handles.check(handle)?;
        if key.is_empty() {
            return Err(StoreError::InvalidInput("row key cannot be empty".into()));
        }

        let table = handle.table();
        let desc = self
            .descriptor(table)?
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        if !desc.has_family(family) {
            return Err(StoreError::FamilyNotFound {
                table: table.to_string(),
                family: family.to_string(),
            });
        }

        let cf = self.table_cf(table)?;
        let _guard = self.write_lock.lock();

        let mut row = match self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            Some(bytes) => decode_row(&bytes)?,
            None => FamilyCells::new(),
        };
        apply_put(&mut row, family, cells, self.clock.next(), desc.max_versions());

        self.db
            .put_cf(&cf, key, encode_row(&row)?)
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        descriptor.validate()?;
        let _guard = self.write_lock.lock();

        if let Some(existing) = self.descriptor(descriptor.name())? {
            if &existing == descriptor {
                return Ok(());
            }
            return Err(StoreError::TableExists(descriptor.name().to_string()));
        }

        let cf_name = Self::cf_name(descriptor.name());
        if self.db.cf_handle(&cf_name).is_none() {
            self.db
                .create_cf(&cf_name, &table_cf_options(&self.settings))
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }

        let bytes = bincode::serde::encode_to_vec(descriptor, bincode::config::standard())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let catalog = self.catalog_cf()?;
        self.db
            .put_cf(&catalog, descriptor.name().as_bytes(), bytes)
            .map_err(|e| StoreError::Io(e.to_string()))?;

        self.descriptors
            .write()
            .insert(descriptor.name().to_string(), descriptor.clone());
        log::info!(
            "Created table {} (families: {:?}, max_versions: {})",
            descriptor.name(),
            descriptor.families(),
            descriptor.max_versions()
        );
        Ok(())
    }

    fn table_exists(&self, name: &str) -> bool {
        matches!(self.descriptor(name), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::PageFilter;
    use crate::rocksdb_init::RocksDbInit;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksDbStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = RocksDbInit::with_defaults(temp_dir.path().to_string_lossy())
            .open()
            .unwrap();
        (RocksDbStore::new(db), temp_dir)
    }

    fn cells(pairs: &[(&str, &str)]) -> BTreeMap<Vec<u8>, Vec<u8>> {
        pairs
            .iter()
            .map(|(q, v)| (q.as_bytes().to_vec(), v.as_bytes().to_vec()))
            .collect()
    }

    fn put_rows(store: &RocksDbStore, keys: &[&str]) {
        let handle = store.open_table("t").unwrap();
        for key in keys {
            store
                .put(&handle, key.as_bytes(), "info", &cells(&[("name", key)]))
                .unwrap();
        }
        store.close_table(handle);
    }

    fn scan_keys(store: &RocksDbStore, descriptor: &ScanDescriptor) -> Vec<String> {
        let handle = store.open_table("t").unwrap();
        let keys = store
            .scan(&handle, descriptor)
            .unwrap()
            .map(|r| String::from_utf8(r.unwrap().key).unwrap())
            .collect();
        store.close_table(handle);
        keys
    }

    #[test]
    fn test_create_and_open_table() {
        let (store, _temp) = create_test_store();
        assert!(matches!(
            store.open_table("t"),
            Err(StoreError::TableNotFound(_))
        ));

        store
            .create_table(&TableDescriptor::new("t").with_family("info"))
            .unwrap();
        assert!(store.table_exists("t"));

        let handle = store.open_table("t").unwrap();
        assert_eq!(store.open_handles(), 1);
        store.close_table(handle);
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn test_scan_range() {
        let (store, _temp) = create_test_store();
        store
            .create_table(&TableDescriptor::new("t").with_family("info"))
            .unwrap();
        put_rows(&store, &["d", "b", "a", "c"]);

        assert_eq!(scan_keys(&store, &ScanDescriptor::full()), vec!["a", "b", "c", "d"]);

        let bounded = ScanDescriptor {
            start_row: Some(b"b".to_vec()),
            stop_row: Some(b"c\0".to_vec()),
            ..Default::default()
        };
        assert_eq!(scan_keys(&store, &bounded), vec!["b", "c"]);

        let paged = ScanDescriptor {
            start_row: Some(b"b".to_vec()),
            predicate: Some(Arc::new(PageFilter::new(2))),
            ..Default::default()
        };
        assert_eq!(scan_keys(&store, &paged), vec!["b", "c"]);
    }

    #[test]
    fn test_versions_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_string_lossy().into_owned();
        {
            let store = RocksDbStore::new(RocksDbInit::with_defaults(path.clone()).open().unwrap());
            store
                .create_table(&TableDescriptor::new("t").with_family("info").with_max_versions(2))
                .unwrap();
            let handle = store.open_table("t").unwrap();
            for value in ["old", "new"] {
                store.put(&handle, b"r1", "info", &cells(&[("name", value)])).unwrap();
            }
            store.close_table(handle);
        }

        let store = RocksDbStore::new(RocksDbInit::with_defaults(path).open().unwrap());
        let handle = store.open_table("t").unwrap();
        let rows: Vec<RawRow> = store
            .scan(&handle, &ScanDescriptor::full())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        store.close_table(handle);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].version_count(), 2);
        assert_eq!(rows[0].latest_value(b"info", b"name"), Some(&b"new"[..]));
    }

    #[test]
    fn test_put_after_reopen_wins_over_future_versions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_string_lossy().into_owned();
        {
            let store = RocksDbStore::new(RocksDbInit::with_defaults(path.clone()).open().unwrap());
            store
                .create_table(&TableDescriptor::new("t").with_family("info").with_max_versions(1))
                .unwrap();
            let handle = store.open_table("t").unwrap();
            for i in 0..200 {
                let value = format!("v{}", i);
                store
                    .put(&handle, b"r1", "info", &cells(&[("name", value.as_str())]))
                    .unwrap();
            }
            store.close_table(handle);

            // Leave the stored version far ahead of the wall clock, as a
            // long write burst would
            let cf = store.table_cf("t").unwrap();
            let mut row = decode_row(&store.db().get_cf(&cf, b"r1").unwrap().unwrap()).unwrap();
            let future = u64::MAX / 2;
            apply_put(&mut row, "info", &cells(&[("name", "burst")]), future, 1);
            store.db().put_cf(&cf, b"r1", encode_row(&row).unwrap()).unwrap();
        }

        let store = RocksDbStore::new(RocksDbInit::with_defaults(path).open().unwrap());
        let handle = store.open_table("t").unwrap();
        store
            .put(&handle, b"r1", "info", &cells(&[("name", "final")]))
            .unwrap();
        let rows: Vec<RawRow> = store
            .scan(&handle, &ScanDescriptor::full())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        store.close_table(handle);

        assert_eq!(rows[0].version_count(), 1);
        assert_eq!(rows[0].latest_value(b"info", b"name"), Some(&b"final"[..]));
    }

    #[test]
    fn test_put_unknown_family() {
        let (store, _temp) = create_test_store();
        store
            .create_table(&TableDescriptor::new("t").with_family("info"))
            .unwrap();
        let handle = store.open_table("t").unwrap();
        let err = store.put(&handle, b"r1", "meta", &cells(&[("a", "b")])).unwrap_err();
        store.close_table(handle);
        assert!(matches!(err, StoreError::FamilyNotFound { .. }));
    }

    #[test]
    fn test_create_table_conflict() {
        let (store, _temp) = create_test_store();
        let desc = TableDescriptor::new("t").with_family("info");
        store.create_table(&desc).unwrap();
        store.create_table(&desc).unwrap();

        let err = store
            .create_table(&TableDescriptor::new("t").with_family("meta"))
            .unwrap_err();
        assert_eq!(err, StoreError::TableExists("t".into()));
    }
}
