//! Service configuration
//!
//! Loaded from an optional JSON file; every field has a default so the
//! service runs out of the box against a local node.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Address the HTTP server binds to
    pub listen_address: String,
    /// Directory for the transaction store
    pub data_dir: PathBuf,
    /// Base URL of the chain node
    pub node_url: String,
    /// Network id, selects the address prefix
    pub network_id: u32,
    /// Pending-transaction lifetime in days; <= 0 selects the default
    pub tx_expiration_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8080".to_string(),
            data_dir: PathBuf::from(".sigvault_data"),
            node_url: "http://127.0.0.1:9650".to_string(),
            network_id: 1,
            tx_expiration_days: 0,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config {}", path.display());
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Load from an explicit path, from `config.json` in the working
    /// directory if present, or fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen_address, "0.0.0.0:8080");
        assert_eq!(config.network_id, 1);
        assert_eq!(config.tx_expiration_days, 0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"nodeUrl": "http://node:9650", "networkId": 5}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.node_url, "http://node:9650");
        assert_eq!(config.network_id, 5);
        assert_eq!(config.listen_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
