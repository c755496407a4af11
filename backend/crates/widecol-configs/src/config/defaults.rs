use widecol_commons::constants::DEFAULT_MAX_VERSIONS;

// Store defaults
pub fn default_store_backend() -> String {
    "rocksdb".to_string()
}

pub fn default_zookeeper_quorum() -> String {
    "localhost".to_string()
}

pub fn default_client_port() -> u16 {
    5181 // MapR ZooKeeper client port
}

pub fn default_data_path() -> String {
    "./data".to_string() // Default dev path; normalized to absolute at runtime
}

pub fn default_max_versions() -> u32 {
    DEFAULT_MAX_VERSIONS
}

// RocksDB defaults
pub fn default_rocksdb_write_buffer_size() -> usize {
    4 * 1024 * 1024 // 4MB
}

pub fn default_rocksdb_max_write_buffers() -> i32 {
    2
}

pub fn default_rocksdb_block_cache_size() -> usize {
    8 * 1024 * 1024 // 8MB, shared across all tables
}

pub fn default_rocksdb_max_background_jobs() -> i32 {
    2
}

pub fn default_rocksdb_max_open_files() -> i32 {
    512
}

// Logging defaults
pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_true() -> bool {
    true
}
