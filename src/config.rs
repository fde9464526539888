use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::account::NetworkConventionTable;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "provision.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ProvisionConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub network_suffixes: NetworkConventionTable,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NetworkConfig {
    #[serde(default = "default_network_id")]
    pub network_id: String,
    #[serde(default = "default_node_url")]
    pub node_url: String,
    #[serde(default)]
    pub key_store_path: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_network_id() -> String {
    "default".to_string()
}

fn default_node_url() -> String {
    "http://localhost:3030".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_id: default_network_id(),
            node_url: default_node_url(),
            key_store_path: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProvisionConfig {
    /// Missing file means defaults; a file that exists must parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("Config file not found at '{}'. Using defaults.", path.display());
            return Ok(Self::default());
        }

        let s = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml(&s).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        info!("Config loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
