use super::types::ConnectorConfig;
use std::fs;
use std::path::{Path, PathBuf};

const VALID_BACKENDS: [&str; 2] = ["rocksdb", "memory"];
const VALID_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const VALID_FORMATS: [&str; 2] = ["compact", "json"];

impl ConnectorConfig {
    /// Load configuration from a TOML file
    ///
    /// Note: Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&content)
    }

    /// Parse and finalize configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let mut config: ConnectorConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.finalize()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported variables:
    /// - WIDECOL_STORE_BACKEND: Override store.backend
    /// - WIDECOL_ZOOKEEPER_QUORUM: Override store.zookeeper_quorum
    /// - WIDECOL_CLIENT_PORT: Override store.client_port
    /// - WIDECOL_DATA_DIR: Override store.data_path
    /// - WIDECOL_LOG_LEVEL: Override logging.level
    /// - WIDECOL_LOG_FILE: Override logging.file_path
    /// - WIDECOL_LOG_TO_CONSOLE: Override logging.log_to_console
    ///
    /// Environment variables take precedence over file values.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("WIDECOL_STORE_BACKEND") {
            self.store.backend = backend.to_lowercase();
        }

        if let Some(quorum) = lookup("WIDECOL_ZOOKEEPER_QUORUM") {
            self.store.zookeeper_quorum = quorum;
        }

        if let Some(port_str) = lookup("WIDECOL_CLIENT_PORT") {
            self.store.client_port = port_str
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid WIDECOL_CLIENT_PORT value: {}", port_str))?;
        }

        if let Some(path) = lookup("WIDECOL_DATA_DIR") {
            self.store.data_path = path;
        }

        if let Some(level) = lookup("WIDECOL_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Some(path) = lookup("WIDECOL_LOG_FILE") {
            self.logging.file_path = Some(path);
        }

        if let Some(val) = lookup("WIDECOL_LOG_TO_CONSOLE") {
            self.logging.log_to_console =
                val.eq_ignore_ascii_case("true") || val == "1" || val.eq_ignore_ascii_case("yes");
        }

        Ok(())
    }

    /// Normalize local filesystem paths and validate configuration.
    ///
    /// Call this after applying environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.store.data_path = normalize_dir_path(&self.store.data_path);
        self.validate()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if !VALID_BACKENDS.contains(&self.store.backend.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid store backend '{}'. Must be one of: {}",
                self.store.backend,
                VALID_BACKENDS.join(", ")
            ));
        }

        if self.store.zookeeper_quorum.trim().is_empty() {
            return Err(anyhow::anyhow!("zookeeper_quorum cannot be empty"));
        }

        if self.store.client_port == 0 {
            return Err(anyhow::anyhow!("client_port cannot be 0"));
        }

        if self.store.default_max_versions == 0 {
            return Err(anyhow::anyhow!("default_max_versions must be at least 1"));
        }

        if self.store.backend == "rocksdb" && self.store.data_path.trim().is_empty() {
            return Err(anyhow::anyhow!("data_path cannot be empty for the rocksdb backend"));
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            ));
        }

        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LEVELS.join(", ")
                ));
            }
        }

        Ok(())
    }
}

/// Resolve a relative directory against the current working directory.
fn normalize_dir_path(path: &str) -> String {
    let p = PathBuf::from(path);
    if p.as_os_str().is_empty() || p.is_absolute() {
        return path.to_string();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(p).to_string_lossy().into_owned(),
        Err(_) => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConnectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.backend, "rocksdb");
        assert_eq!(config.store.default_max_versions, 3);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ConnectorConfig::from_toml_str("").unwrap();
        assert_eq!(config.store.client_port, 5181);
        assert!(Path::new(&config.store.data_path).is_absolute());
    }

    #[test]
    fn test_parse_sections() {
        let toml = r#"
            [store]
            backend = "memory"
            zookeeper_quorum = "zk1,zk2,zk3"
            client_port = 2181
            default_max_versions = 5

            [logging]
            level = "debug"
            format = "json"

            [logging.targets]
            widecol_store = "trace"
        "#;
        let config = ConnectorConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.store.backend, "memory");
        assert_eq!(config.store.default_max_versions, 5);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.targets.get("widecol_store").unwrap(), "trace");

        let props = config.store.connection_properties();
        assert_eq!(props.get("zookeeper.quorum").unwrap(), "zk1,zk2,zk3");
        assert_eq!(props.get("zookeeper.property.clientPort").unwrap(), "2181");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("widecol.toml");
        std::fs::write(&path, "[store]\nbackend = \"memory\"\n").unwrap();

        let config = ConnectorConfig::from_file(&path).unwrap();
        assert_eq!(config.store.backend, "memory");

        assert!(ConnectorConfig::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = ConnectorConfig::default();
        config.store.client_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_backend() {
        let err = ConnectorConfig::from_toml_str("[store]\nbackend = \"hbase\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid store backend"));
    }

    #[test]
    fn test_zero_max_versions_rejected() {
        let mut config = ConnectorConfig::default();
        config.store.default_max_versions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = ConnectorConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        let mut config = ConnectorConfig::default();
        config.logging.targets.insert("widecol_core".into(), "loud".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("WIDECOL_STORE_BACKEND", "MEMORY"),
            ("WIDECOL_ZOOKEEPER_QUORUM", "zk-a,zk-b"),
            ("WIDECOL_CLIENT_PORT", "2181"),
            ("WIDECOL_DATA_DIR", "/var/lib/widecol"),
            ("WIDECOL_LOG_LEVEL", "DEBUG"),
            ("WIDECOL_LOG_FILE", "/var/log/widecol.log"),
            ("WIDECOL_LOG_TO_CONSOLE", "no"),
        ]
        .into_iter()
        .collect();

        let mut config = ConnectorConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.store.backend, "memory");
        assert_eq!(config.store.zookeeper_quorum, "zk-a,zk-b");
        assert_eq!(config.store.client_port, 2181);
        assert_eq!(config.store.data_path, "/var/lib/widecol");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file_path.as_deref(), Some("/var/log/widecol.log"));
        assert!(!config.logging.log_to_console);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override_bad_port() {
        let mut config = ConnectorConfig::default();
        let result = config.apply_overrides(|name| {
            (name == "WIDECOL_CLIENT_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }
}
