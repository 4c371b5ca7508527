//! Configuration management for the Agri Assistant client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Optional configuration file (config/client.{toml,json,...})
//! 3. Environment variable overrides: `AGRI__` prefix, `__` between nested
//!    keys (e.g. `AGRI__CART__STOCK_CEILING=50`)
//!
//! Browser hosts have no environment or filesystem, so they layer a JSON
//! document over the same defaults with [`ClientConfig::from_json`].

use config::{ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Main client configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST backend
    pub api_base: String,

    /// Currency symbol used when formatting prices
    pub currency_symbol: String,

    /// Cart persistence settings
    pub cart: CartConfig,

    /// Storage keys holding the login session
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CartConfig {
    /// Storage key holding the serialized cart lines
    pub storage_key: String,

    /// Quantity ceiling applied when a product has no known stock
    pub stock_ceiling: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SessionConfig {
    pub token_key: String,
    pub username_key: String,
    pub email_key: String,
}

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CART_KEY: &str = "cart_items";
pub const DEFAULT_STOCK_CEILING: u32 = 9999;

impl ClientConfig {
    /// Load configuration from an optional file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::with_name("config/client").required(false))
            .add_source(
                Environment::with_prefix("AGRI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Layer a JSON document over the defaults; missing keys keep their default
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("currency_symbol", "₹")?
            .set_default("cart.storage_key", DEFAULT_CART_KEY)?
            .set_default("cart.stock_ceiling", i64::from(DEFAULT_STOCK_CEILING))?
            .set_default("session.token_key", "access_token")?
            .set_default("session.username_key", "username")?
            .set_default("session.email_key", "email")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            currency_symbol: "₹".to_string(),
            cart: CartConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_CART_KEY.to_string(),
            stock_ceiling: DEFAULT_STOCK_CEILING,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "access_token".to_string(),
            username_key: "username".to_string(),
            email_key: "email".to_string(),
        }
    }
}
