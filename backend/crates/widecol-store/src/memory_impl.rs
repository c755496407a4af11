//! In-memory implementation of the StoreClient trait.
//!
//! Rows live in a `BTreeMap` per table, so scans come out in key order
//! exactly like a real store. Used for tests and for the `memory` backend.

use crate::cells::{apply_put, FamilyCells, RawRow, TimestampOracle};
use crate::handles::HandleRegistry;
use crate::scan::{ScanCursor, ScanDescriptor};
use crate::storage_trait::{
    RawRowIter, Result, StoreClient, StoreError, TableDescriptor, TableHandle,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

struct MemTable {
    descriptor: TableDescriptor,
    rows: BTreeMap<Vec<u8>, FamilyCells>,
}

/// Thread-safe, non-persistent store.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, MemTable>>,
    clock: TimestampOracle,
    handles: HandleRegistry,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of table handles currently open.
    pub fn open_handles(&self) -> usize {
        self.handles.open_count()
    }

    /// Number of rows stored in a table.
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let tables = self.tables.read();
        tables
            .get(table)
            .map(|t| t.rows.len())
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }
}

impl StoreClient for InMemoryStore {
    fn open_table(&self, name: &str) -> Result<TableHandle> {
        if !self.tables.read().contains_key(name) {
            return Err(StoreError::TableNotFound(name.to_string()));
        }
        Ok(self.handles.open(name))
    }

    fn close_table(&self, handle: TableHandle) {
        self.handles.close(handle);
    }

    fn scan(&self, handle: &TableHandle, descriptor: &ScanDescriptor) -> Result<RawRowIter<'_>> {
        self.handles.check(handle)?;

        let tables = self.tables.read();
        let table = tables
            .get(handle.table())
            .ok_or_else(|| StoreError::TableNotFound(handle.table().to_string()))?;

        // Cursor runs under the lock: rows past the row limit are never copied
        let rows: Vec<Result<RawRow>> = if descriptor.is_empty_range() {
            Vec::new()
        } else {
            let range = table
                .rows
                .range(descriptor.key_bounds())
                .map(|(key, families)| Ok(RawRow::with_families(key.clone(), families.clone())));
            ScanCursor::new(range, descriptor).collect()
        };

        Ok(Box::new(rows.into_iter()))
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

        let mut tables = self.tables.write();
        let table = tables
            .get_mut(handle.table())
            .ok_or_else(|| StoreError::TableNotFound(handle.table().to_string()))?;
        if !table.descriptor.has_family(family) {
            return Err(StoreError::FamilyNotFound {
                table: handle.table().to_string(),
                family: family.to_string(),
            });
        }

        let timestamp = self.clock.next();
        let max_versions = table.descriptor.max_versions();
        let row = table.rows.entry(key.to_vec()).or_default();
        apply_put(row, family, cells, timestamp, max_versions);
        Ok(())
    }

    fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        descriptor.validate()?;

        let mut tables = self.tables.write();
        if let Some(existing) = tables.get(descriptor.name()) {
            if &existing.descriptor == descriptor {
                return Ok(());
            }
            return Err(StoreError::TableExists(descriptor.name().to_string()));
        }

        tables.insert(
            descriptor.name().to_string(),
            MemTable {
                descriptor: descriptor.clone(),
                rows: BTreeMap::new(),
            },
        );
        log::debug!("Created in-memory table {}", descriptor.name());
        Ok(())
    }

    fn table_exists(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }
}
