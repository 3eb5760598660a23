//! Client configuration.
//!
//! Sources, later ones winning:
//! 1. built-in defaults,
//! 2. an optional `config/pharmacy.{toml,yaml,json}` file,
//! 3. environment variables prefixed with `PHARMACY_` (nested keys use `__`),
//!    e.g. `PHARMACY_BASE_URL`, `PHARMACY_AUTH_TOKEN`.

use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: i64 = 30;
const DEFAULT_CHANNEL_CAPACITY: i64 = 64;
const DEFAULT_BATCH_PICK_LIMIT: i64 = 20;
const CONFIG_FILE: &str = "config/pharmacy";
const ENV_PREFIX: &str = "PHARMACY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Root of the REST API, e.g. `https://hims.example.org/api`.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout_secs: u64,

    /// Bearer token sent with every request.
    #[serde(default)]
    pub auth_token: Option<String>,

    pub user_agent: String,

    /// Queue depth between client handles and the transport.
    pub channel_capacity: usize,

    /// `limit` sent when fetching batch options for a dispense line.
    pub batch_pick_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS as u64,
            auth_token: None,
            user_agent: default_user_agent(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY as usize,
            batch_pick_limit: DEFAULT_BATCH_PICK_LIMIT as u32,
        }
    }
}

fn default_user_agent() -> String {
    format!("pharmacy-client/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got `{url}`"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if self.batch_pick_limit == 0 {
            return Err(ConfigError::Invalid("batch_pick_limit must be positive".into()));
        }
        Ok(())
    }
}

/// Loads and validates configuration from defaults, file and environment.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    let config = Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
        .set_default("user_agent", default_user_agent())?
        .set_default("channel_capacity", DEFAULT_CHANNEL_CAPACITY)?
        .set_default("batch_pick_limit", DEFAULT_BATCH_PICK_LIMIT)?
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let client_config: ClientConfig = config.try_deserialize()?;
    client_config.validate().map_err(|e| {
        error!(error = %e, "Configuration validation failed");
        e
    })?;

    info!(base_url = %client_config.base_url, "Configuration loaded");
    Ok(client_config)
}
