//! Ledger configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local publisher endpoint for content-addressed storage
pub const DEFAULT_PUBLISHER_URL: &str = "http://127.0.0.1:31415";
/// Local aggregator endpoint for content-addressed storage
pub const DEFAULT_AGGREGATOR_URL: &str = "http://127.0.0.1:31416";
/// Storage epochs a blob is paid for
pub const DEFAULT_EPOCHS: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    #[default]
    Localnet,
}

/// Where asset images and encrypted payloads are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    /// S3-style object store. References are `{endpoint}/{bucket}/{folder}/{name}`.
    Bucket {
        endpoint: String,
        bucket: String,
        folder: String,
        region: String,
    },
    /// Content-addressed blob store. References are `{aggregator_url}/v1/{blob_id}`.
    Walrus {
        publisher_url: String,
        aggregator_url: String,
        #[serde(default = "default_epochs")]
        epochs: u32,
    },
}

fn default_epochs() -> u32 {
    DEFAULT_EPOCHS
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Walrus {
            publisher_url: DEFAULT_PUBLISHER_URL.to_string(),
            aggregator_url: DEFAULT_AGGREGATOR_URL.to_string(),
            epochs: DEFAULT_EPOCHS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub network: Network,
    /// On-chain package owning the asset type. Empty on a local ledger.
    #[serde(default)]
    pub package_id: String,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl LedgerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network != Network::Localnet && self.package_id.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "package_id is required on {:?}",
                self.network
            )));
        }
        if !self.package_id.is_empty() && hex::decode(self.package_id.trim_start_matches("0x")).is_err() {
            return Err(ConfigError::Invalid(format!(
                "package_id is not hex: {}",
                self.package_id
            )));
        }

        match &self.storage {
            StorageConfig::Bucket {
                endpoint,
                bucket,
                folder,
                region,
            } => {
                check_url("endpoint", endpoint)?;
                for (field, value) in [("bucket", bucket), ("folder", folder), ("region", region)] {
                    if value.is_empty() {
                        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
                    }
                }
            }
            StorageConfig::Walrus {
                publisher_url,
                aggregator_url,
                epochs,
            } => {
                check_url("publisher_url", publisher_url)?;
                check_url("aggregator_url", aggregator_url)?;
                if *epochs == 0 {
                    return Err(ConfigError::Invalid("epochs must be > 0".to_string()));
                }
            }
        }
        Ok(())
    }
}

fn check_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{field} must be an http(s) URL: {url:?}")))
    }
}
