//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlbridge_sql::StorageConfig;

use crate::error::{ClientError, ClientResult};

/// Default name of the worker thread.
pub const DEFAULT_WORKER_NAME: &str = "sqlbridge-worker";

/// Client configuration.
///
/// Deserialises from TOML such as:
///
/// ```toml
/// query_timeout_ms = 5000
///
/// [storage]
/// kind = "json"
/// path = "data/app.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Storage backend to open.
    pub storage: StorageConfig,
    /// Default bound for [`Glue::execute`](crate::Glue::execute), in
    /// milliseconds. `None` waits forever.
    pub query_timeout_ms: Option<u64>,
    /// Name given to the worker thread.
    pub worker_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::Memory,
            query_timeout_ms: None,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    /// Creates a default configuration: memory storage, no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage backend.
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Sets the default query timeout.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    /// Sets the worker thread name.
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Returns the default query timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }

    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> ClientResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Checks field values.
    pub fn validate(&self) -> ClientResult<()> {
        if self.worker_name.trim().is_empty() {
            return Err(ClientError::Config("worker_name must not be empty".to_string()));
        }
        if self.query_timeout_ms == Some(0) {
            return Err(ClientError::Config(
                "query_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
