use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub graph: GraphConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Which graph store backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Sqlite,
    Memory,
}

/// Graph store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageKind,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Sample ingestion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// First line of the sample file is a header
    #[serde(default = "default_true")]
    pub skip_header: bool,
    /// Wipe the graph before ingesting (wholesale rebuild)
    #[serde(default = "default_true")]
    pub clear_before_ingest: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            skip_header: true,
            clear_before_ingest: true,
        }
    }
}

/// Path query configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_max_depth")]
    pub default_max_depth: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_max_depth: default_max_depth(),
        }
    }
}

fn default_storage() -> StorageKind {
    StorageKind::Sqlite
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./kgpath.db")
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    7
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in KGPATH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("KGPATH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::load_from(&config_path)
    }

    /// Load and validate configuration from an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml_str(&config_str)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)
            .context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.query.default_max_depth == 0 {
            anyhow::bail!("query.default_max_depth must be greater than 0");
        }

        if self.graph.storage == StorageKind::Sqlite
            && self.graph.db_path.as_os_str().is_empty()
        {
            anyhow::bail!("graph.db_path must be set when graph.storage = \"sqlite\"");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.graph.db_path
    }

    /// Get the SQL migrations directory
    pub fn migrations_dir(&self) -> &Path {
        &self.graph.migrations_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    const FULL_CONFIG: &str = r#"
[graph]
storage = "sqlite"
db_path = "./test.db"
migrations_dir = "./migrations"
log_level = "debug"

[ingest]
skip_header = false
clear_before_ingest = false

[query]
default_max_depth = 3
"#;

    #[test]
    fn test_config_parse_full() {
        let config = Config::from_toml_str(FULL_CONFIG).unwrap();
        assert_eq!(config.graph.storage, StorageKind::Sqlite);
        assert_eq!(config.graph.log_level, "debug");
        assert!(!config.ingest.skip_header);
        assert!(!config.ingest.clear_before_ingest);
        assert_eq!(config.query.default_max_depth, 3);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_toml_str("[graph]\n").unwrap();
        assert_eq!(config.graph.storage, StorageKind::Sqlite);
        assert_eq!(config.db_path(), Path::new("./kgpath.db"));
        assert_eq!(config.migrations_dir(), Path::new("migrations"));
        assert_eq!(config.graph.log_level, "info");
        assert!(config.ingest.skip_header);
        assert!(config.ingest.clear_before_ingest);
        assert_eq!(config.query.default_max_depth, 7);
    }

    #[test]
    fn test_config_memory_storage() {
        let config = Config::from_toml_str("[graph]\nstorage = \"memory\"\n").unwrap();
        assert_eq!(config.graph.storage, StorageKind::Memory);
    }

    #[test]
    fn test_config_rejects_zero_depth() {
        let err = Config::from_toml_str("[graph]\n[query]\ndefault_max_depth = 0\n").unwrap_err();
        assert!(err.to_string().contains("default_max_depth"));
    }

    #[test]
    fn test_config_rejects_unknown_storage() {
        assert!(Config::from_toml_str("[graph]\nstorage = \"neo4j\"\n").is_err());
    }

    #[test]
    fn test_config_load_from_env_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        fs::write(&config_path, FULL_CONFIG).unwrap();

        let original = std::env::var("KGPATH_CONFIG").ok();
        std::env::set_var("KGPATH_CONFIG", config_path.to_str().unwrap());
        let config = Config::load();
        std::env::remove_var("KGPATH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("KGPATH_CONFIG", v);
        }

        let config = config.unwrap();
        assert_eq!(config.query.default_max_depth, 3);
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("KGPATH_CONFIG").ok();
        std::env::set_var("KGPATH_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("KGPATH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("KGPATH_CONFIG", v);
        }
    }
}
