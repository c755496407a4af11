use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Main connector configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Store connection and storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Store client implementation: "rocksdb" (embedded, persistent) or "memory"
    /// (in-process only; the `widecol` binary refuses it)
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Comma-separated ZooKeeper quorum hosts of the store cluster.
    /// Passed through to the store client untouched.
    #[serde(default = "default_zookeeper_quorum")]
    pub zookeeper_quorum: String,

    /// Client port of the ZooKeeper quorum
    #[serde(default = "default_client_port")]
    pub client_port: u16,

    /// Base directory for embedded store data (default: "./data")
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Versions kept per cell for tables created without an explicit value
    #[serde(default = "default_max_versions")]
    pub default_max_versions: u32,

    #[serde(default)]
    pub rocksdb: RocksDbSettings,
}

impl StoreSettings {
    /// Get RocksDB directory path (data_path/rocksdb)
    pub fn rocksdb_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_path).join("rocksdb")
    }

    /// Connection properties handed to the store client.
    pub fn connection_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        props.insert("zookeeper.quorum".to_string(), self.zookeeper_quorum.clone());
        props.insert(
            "zookeeper.property.clientPort".to_string(),
            self.client_port.to_string(),
        );
        props
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            zookeeper_quorum: default_zookeeper_quorum(),
            client_port: default_client_port(),
            data_path: default_data_path(),
            default_max_versions: default_max_versions(),
            rocksdb: RocksDbSettings::default(),
        }
    }
}

/// RocksDB-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDbSettings {
    /// Write buffer size per table in bytes (default: 4MB)
    #[serde(default = "default_rocksdb_write_buffer_size")]
    pub write_buffer_size: usize,

    /// Maximum number of write buffers (default: 2)
    #[serde(default = "default_rocksdb_max_write_buffers")]
    pub max_write_buffers: i32,

    /// Block cache size for reads in bytes (default: 8MB, shared across all tables)
    #[serde(default = "default_rocksdb_block_cache_size")]
    pub block_cache_size: usize,

    /// Maximum number of background jobs (default: 2)
    #[serde(default = "default_rocksdb_max_background_jobs")]
    pub max_background_jobs: i32,

    /// Maximum number of open files RocksDB can keep open (default: 512)
    /// Set to -1 for unlimited.
    #[serde(default = "default_rocksdb_max_open_files")]
    pub max_open_files: i32,
}

impl Default for RocksDbSettings {
    fn default() -> Self {
        Self {
            write_buffer_size: default_rocksdb_write_buffer_size(),
            max_write_buffers: default_rocksdb_max_write_buffers(),
            block_cache_size: default_rocksdb_block_cache_size(),
            max_background_jobs: default_rocksdb_max_background_jobs(),
            max_open_files: default_rocksdb_max_open_files(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// Optional log file. No file layer is installed when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Optional per-target log level overrides
    /// [logging.targets]
    /// widecol_store = "debug"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_to_console: true,
            file_path: None,
            targets: HashMap::new(),
        }
    }
}
