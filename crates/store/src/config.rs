//! Tool host configuration.

use serde::Deserialize;
use std::path::Path;

const DEFAULT_API_BASE: &str = "http://localhost:4001/MerchantStore";
const DEFAULT_MERCHANT_ID: &str = "Tnc";

/// Where the remote store API lives and which merchant the tools act for.
///
/// Both values default to the development deployment; tests point
/// `api_base` at a local mock server.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the remote store API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Owner identifier sent as `merchantId` on every request.
    #[serde(default = "default_merchant_id")]
    pub merchant_id: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_merchant_id() -> String {
    DEFAULT_MERCHANT_ID.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            merchant_id: default_merchant_id(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults with environment overrides applied.
    ///
    /// `CLERK_STORE_API_BASE` and `CLERK_MERCHANT_ID` override the
    /// corresponding fields when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base) = std::env::var("CLERK_STORE_API_BASE") {
            config.api_base = base;
        }
        if let Ok(id) = std::env::var("CLERK_MERCHANT_ID") {
            config.merchant_id = id;
        }
        config
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
