//! RocksDB initialization utilities for widecol.
//!
//! Provides a thin helper to open a RocksDB instance with the table catalog
//! column family present and every existing table column family reopened.

use anyhow::Result;
use rocksdb::{BlockBasedOptions, Cache, ColumnFamilyDescriptor, MultiThreaded, Options};
use std::path::Path;
use std::sync::Arc;
use widecol_commons::constants::TABLE_CATALOG_PARTITION;
use widecol_configs::RocksDbSettings;

/// RocksDB handle type used by the store. Multi-threaded so column
/// families can be created through a shared reference.
pub type RocksDb = rocksdb::DBWithThreadMode<MultiThreaded>;

/// RocksDB initializer for creating/opening a database with the catalog CF.
pub struct RocksDbInit {
    db_path: String,
    settings: RocksDbSettings,
}

impl RocksDbInit {
    /// Create a new initializer for the given path with custom settings.
    pub fn new(db_path: impl Into<String>, settings: RocksDbSettings) -> Self {
        Self {
            db_path: db_path.into(),
            settings,
        }
    }

    /// Create a new initializer with default settings.
    pub fn with_defaults(db_path: impl Into<String>) -> Self {
        Self::new(db_path, RocksDbSettings::default())
    }

    /// Open or create the RocksDB database and ensure the catalog CF exists.
    pub fn open(&self) -> Result<Arc<RocksDb>> {
        let path = Path::new(&self.db_path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_write_buffer_size(self.settings.write_buffer_size);
        db_opts.set_max_write_buffer_number(self.settings.max_write_buffers);
        db_opts.set_max_background_jobs(self.settings.max_background_jobs);
        db_opts.set_max_open_files(self.settings.max_open_files);

        // Block cache is shared across all column families
        let cache = Cache::new_lru_cache(self.settings.block_cache_size);
        db_opts.set_block_based_table_factory(&create_block_options_with_cache(&cache));

        // Determine existing CFs (or default if DB missing)
        let mut existing = match RocksDb::list_cf(&db_opts, path) {
            Ok(cfs) if !cfs.is_empty() => cfs,
            _ => vec!["default".to_string()],
        };
        if !existing.iter().any(|n| n == TABLE_CATALOG_PARTITION) {
            existing.push(TABLE_CATALOG_PARTITION.to_string());
        }

        let cf_descriptors: Vec<_> = existing
            .iter()
            .map(|name| {
                let mut cf_opts = table_cf_options(&self.settings);
                cf_opts.set_block_based_table_factory(&create_block_options_with_cache(&cache));
                ColumnFamilyDescriptor::new(name, cf_opts)
            })
            .collect();

        let db = RocksDb::open_cf_descriptors(&db_opts, path, cf_descriptors)?;
        log::debug!(
            "Opened RocksDB at {} with {} column families",
            self.db_path,
            existing.len()
        );

        Ok(Arc::new(db))
    }
}

/// Options applied to every table column family.
pub(crate) fn table_cf_options(settings: &RocksDbSettings) -> Options {
    let mut cf_opts = Options::default();
    cf_opts.set_write_buffer_size(settings.write_buffer_size);
    cf_opts.set_max_write_buffer_number(settings.max_write_buffers);
    cf_opts
}

pub(crate) fn create_block_options_with_cache(cache: &Cache) -> BlockBasedOptions {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_bloom_filter(10.0, false);
    block_opts.set_cache_index_and_filter_blocks(true);
    block_opts
}
