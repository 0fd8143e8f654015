// Configuration management for the ledger node

use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub node: NodeConfig,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Address the HTTP API binds to
    pub listen: SocketAddr,
    /// Recipient of mining rewards; random when absent
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Peers registered at startup
    pub peers: Vec<String>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Upper bound on peer fetches in flight during reconciliation
    pub max_concurrent_fetches: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5000)),
            identifier: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            peers: Vec::new(),
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
            max_concurrent_fetches: 8,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `config.toml` in the
    /// working directory is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_str = match path {
            Some(path) => fs::read_to_string(path)?,
            None => fs::read_to_string(DEFAULT_CONFIG_FILE).unwrap_or_default(),
        };

        let config = Self::from_toml_str(&config_str)?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate critical values
    pub fn validate(&self) -> Result<()> {
        if self.network.max_concurrent_fetches == 0 {
            return Err(LedgerError::Config(
                "network.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.network.request_timeout_secs == 0 || self.network.connect_timeout_secs == 0 {
            return Err(LedgerError::Config(
                "network timeouts must be at least 1 second".to_string(),
            ));
        }
        if matches!(&self.node.identifier, Some(id) if id.trim().is_empty()) {
            return Err(LedgerError::Config("node.identifier must not be empty".to_string()));
        }
        Ok(())
    }

    /// Configured identifier, or a fresh random 32-hex-digit one
    pub fn node_identifier(&self) -> String {
        self.node
            .identifier
            .clone()
            .unwrap_or_else(|| format!("{:032x}", rand::random::<u128>()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.network.connect_timeout_secs)
    }
}
