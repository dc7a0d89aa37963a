//! Environment configuration.
//!
//! Values come from the process environment, with a `.env` file loaded first
//! when present. Server and client settings live side by side; each command
//! only reads the part it needs.

use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5001/api/algorand";
pub const DEFAULT_SIGNER_URL: &str = "http://localhost:5002";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_ALGOD_TIMEOUT: Duration = Duration::from_secs(10);
/// Must stay above [`DEFAULT_ALGOD_TIMEOUT`]
pub const DEFAULT_STATUS_CHECK_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set.")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Settings for `serve`
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` selects the in-memory store
    pub database_url: Option<String>,
    pub algod_server: String,
    pub algod_token: String,
    pub algod_port: String,
    pub signer_url: String,
    pub algod_timeout: Duration,
    pub allowed_origins: Option<String>,
}

/// Settings for `watch` and `send`
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    pub poll_interval: Duration,
    pub status_check_timeout: Duration,
}

/// Load `.env` if there is one
pub fn load_dotenv() {
    dotenv::dotenv().ok();
}

fn var_or(name: &'static str, fallback: &str) -> String {
    // An explicitly empty value is kept as-is
    env::var(name).unwrap_or_else(|_| fallback.to_string())
}

fn optional_var(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_secs(name: &'static str, fallback: Duration) -> Result<Duration, ConfigError> {
    match optional_var(name) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::Invalid(name, value)),
        None => Ok(fallback),
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match optional_var("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", value))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port,
            database_url: optional_var("DATABASE_URL"),
            algod_server: optional_var("ALGOD_SERVER").ok_or(ConfigError::Missing("ALGOD_SERVER"))?,
            algod_token: var_or("ALGOD_TOKEN", ""),
            algod_port: var_or("ALGOD_PORT", ""),
            signer_url: var_or("SIGNER_URL", DEFAULT_SIGNER_URL),
            algod_timeout: parse_secs("ALGOD_TIMEOUT_SECS", DEFAULT_ALGOD_TIMEOUT)?,
            allowed_origins: optional_var("ALLOWED_ORIGINS"),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: var_or("BACKEND_URL", DEFAULT_BACKEND_URL),
            poll_interval: parse_secs("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL)?,
            status_check_timeout: parse_secs(
                "STATUS_CHECK_TIMEOUT_SECS",
                DEFAULT_STATUS_CHECK_TIMEOUT,
            )?,
        })
    }
}
