//! Store client selection from configuration.

use anyhow::Result;
use std::sync::Arc;
use widecol_configs::StoreSettings;
use widecol_store::{InMemoryStore, RocksDbInit, RocksDbStore, StoreClient};

/// Backends the `widecol` binary can run against.
///
/// Each CLI invocation is its own process, so an in-memory store would lose
/// every table and row between commands. `memory` stays available to
/// library callers and tests through [`open_store`].
pub const CLI_BACKENDS: [&str; 1] = ["rocksdb"];

/// Rejects backends that cannot keep data between CLI invocations.
pub fn check_cli_backend(settings: &StoreSettings) -> Result<()> {
    if CLI_BACKENDS.contains(&settings.backend.as_str()) {
        return Ok(());
    }
    Err(anyhow::anyhow!(
        "Store backend '{}' cannot be used from the command line (data would not outlive the process); use one of: {}",
        settings.backend,
        CLI_BACKENDS.join(", ")
    ))
}

/// Opens the store client named by `store.backend`.
pub fn open_store(settings: &StoreSettings) -> Result<Arc<dyn StoreClient>> {
    for (key, value) in settings.connection_properties() {
        log::debug!("Store connection property {}={}", key, value);
    }

    match settings.backend.as_str() {
        "memory" => {
            log::info!("Using in-memory store (data is not persisted)");
            Ok(Arc::new(InMemoryStore::new()))
        }
        "rocksdb" => {
            let path = settings.rocksdb_dir();
            std::fs::create_dir_all(&path)?;
            let db = RocksDbInit::new(path.to_string_lossy(), settings.rocksdb.clone()).open()?;
            log::info!("Using RocksDB store at {}", path.display());
            Ok(Arc::new(RocksDbStore::with_settings(db, settings.rocksdb.clone())))
        }
        other => Err(anyhow::anyhow!("Unknown store backend '{}'", other)),
    }
}
