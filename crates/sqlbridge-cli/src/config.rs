//! Configuration file support for the CLI.
//!
//! Loads and saves CLI configuration from TOML files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlbridge_client::{ClientConfig, StorageConfig};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default output format.
    #[serde(default = "default_format")]
    pub output_format: String,

    /// Enable timing by default.
    #[serde(default)]
    pub timing: bool,

    /// Query timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// History file path.
    #[serde(default)]
    pub history_file: Option<PathBuf>,

    /// Maximum history size.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Storage backend. Kept last so it serialises as a trailing table.
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_format() -> String {
    "table".to_string()
}

fn default_history_size() -> usize {
    1000
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_format: default_format(),
            timing: false,
            timeout_ms: None,
            history_file: None,
            history_size: default_history_size(),
            storage: StorageConfig::Memory,
        }
    }
}

impl CliConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Loads the default configuration file.
    ///
    /// Looks in the following locations:
    /// 1. `<config dir>/sqlbridge/config.toml`
    /// 2. `~/.sqlbridge/config.toml`
    /// 3. Returns default if not found
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".sqlbridge").join("config.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Returns the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sqlbridge").join("config.toml"))
    }

    /// Returns the query timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Builds the client configuration.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new()
            .storage(self.storage.clone())
            .worker_name("sqlbridge-cli-worker");
        match self.timeout() {
            Some(timeout) => config.query_timeout(timeout),
            None => config,
        }
    }

    /// Returns a builder for configuration.
    pub fn builder() -> CliConfigBuilder {
        CliConfigBuilder::default()
    }
}

/// Builder for CLI configuration.
#[derive(Default)]
pub struct CliConfigBuilder {
    config: CliConfig,
}

impl CliConfigBuilder {
    /// Sets the storage backend.
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Sets the output format.
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.config.output_format = format.into();
        self
    }

    /// Enables timing.
    pub fn timing(mut self, enabled: bool) -> Self {
        self.config.timing = enabled;
        self
    }

    /// Sets the query timeout.
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = Some(timeout_ms);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CliConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.output_format, "table");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_builder() {
        let config = CliConfig::builder()
            .storage(StorageConfig::SharedMemory {
                name: "scratch".into(),
            })
            .output_format("csv")
            .timing(true)
            .timeout_ms(1500)
            .build();

        assert_eq!(config.output_format, "csv");
        assert!(config.timing);
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));

        let client = config.client_config();
        assert_eq!(client.timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(
            client.storage,
            StorageConfig::SharedMemory {
                name: "scratch".into()
            }
        );
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = CliConfig::builder()
            .storage(StorageConfig::Json {
                path: temp_dir.path().join("db.json"),
            })
            .timeout_ms(42)
            .build();

        config.save(&path).unwrap();

        let loaded = CliConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            output_format = "json"
            timing = true

            [storage]
            kind = "shared_memory"
            name = "team"
        "#;

        let config: CliConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::SharedMemory {
                name: "team".into()
            }
        );
        assert_eq!(config.output_format, "json");
        assert!(config.timing);
        assert_eq!(config.history_size, 1000);
    }
}
