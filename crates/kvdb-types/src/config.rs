//! Configuration loading for kvdb.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/kvdb/config.toml.

use config::{Config, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::KvdbError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Memory budget for block cache and write buffer, in MB.
    /// Zero or negative selects the engine default.
    #[serde(default)]
    pub cache_mb: i64,

    /// Maximum number of open file descriptors.
    /// Zero or negative selects the engine default.
    #[serde(default)]
    pub max_open_files: i32,

    /// Record per-operation timers and byte meters
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Label prepended to every metric name
    #[serde(default = "default_metrics_label")]
    pub metrics_label: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "kvdb")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_metrics_label() -> String {
    "kvdb".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_mb: 0,
            max_open_files: 0,
            metrics_enabled: false,
            metrics_label: default_metrics_label(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/kvdb/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (KVDB_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, KvdbError> {
        let config_dir = ProjectDirs::from("", "", "kvdb")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| KvdbError::Config(e.to_string()))?
            .set_default("cache_mb", 0i64)
            .map_err(|e| KvdbError::Config(e.to_string()))?
            .set_default("max_open_files", 0i64)
            .map_err(|e| KvdbError::Config(e.to_string()))?
            .set_default("metrics_enabled", false)
            .map_err(|e| KvdbError::Config(e.to_string()))?
            .set_default("metrics_label", default_metrics_label())
            .map_err(|e| KvdbError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| KvdbError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // KVDB_DB_PATH, KVDB_CACHE_MB, KVDB_METRICS_ENABLED, ...
        builder = builder.add_source(
            Environment::with_prefix("KVDB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| KvdbError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| KvdbError::Config(e.to_string()))
    }

    /// Expand ~ in db_path to the user's home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Some(dirs) = BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.cache_mb, 0);
        assert_eq!(settings.max_open_files, 0);
        assert!(!settings.metrics_enabled);
        assert_eq!(settings.metrics_label, "kvdb");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.metrics_label, "kvdb");
        assert!(!settings.db_path.is_empty());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kvdb.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "db_path = \"/tmp/kvdb-test\"").unwrap();
        writeln!(file, "cache_mb = 64").unwrap();
        writeln!(file, "max_open_files = 128").unwrap();
        writeln!(file, "metrics_enabled = true").unwrap();
        drop(file);

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.db_path, "/tmp/kvdb-test");
        assert_eq!(settings.cache_mb, 64);
        assert_eq!(settings.max_open_files, 128);
        assert!(settings.metrics_enabled);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::load(Some("/nonexistent/kvdb/config.toml"));
        assert!(matches!(result, Err(KvdbError::Config(_))));
    }

    #[test]
    fn test_expanded_db_path_plain() {
        let settings = Settings {
            db_path: "/var/lib/kvdb".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.expanded_db_path(), PathBuf::from("/var/lib/kvdb"));
    }

    #[test]
    fn test_expanded_db_path_home() {
        let settings = Settings {
            db_path: "~/kvdb/db".to_string(),
            ..Settings::default()
        };
        let expanded = settings.expanded_db_path();
        assert!(!expanded.starts_with("~"));
        assert!(expanded.ends_with("kvdb/db"));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let decoded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.metrics_label, settings.metrics_label);
        assert_eq!(decoded.db_path, settings.db_path);
    }
}
