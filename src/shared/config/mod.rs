//! Application configuration module
//!
//! Runtime settings for the chat server. Values come from environment
//! variables (optionally seeded from a `.env` file by the binary) and fall
//! back to development defaults.
//!
//! | Variable | Default |
//! |---|---|
//! | `SERVER_HOST` | `0.0.0.0` |
//! | `SERVER_PORT` | `8000` |
//! | `DATABASE_URL` | unset, in-memory store |
//! | `JWT_SECRET` | development secret |
//! | `REQUIRE_AUTH` | `true` |
//! | `WS_PING_INTERVAL_SECS` | `25` |
//! | `WS_PING_TIMEOUT_SECS` | `60` |
//! | `ALLOWED_ORIGINS` | empty, any origin |
//! | `SEED_DEMO_DATA` | `false` |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is not set. Never deploy with it.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-in-production";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface the HTTP listener binds to
    pub host: String,
    /// Listener port; 0 asks the OS for a free one
    pub port: u16,
    /// PostgreSQL URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    /// Reject WebSocket upgrades without a token matching the path user
    pub require_auth: bool,
    /// Gap between server pings on an idle socket
    pub ws_ping_interval: Duration,
    /// Close the socket when no frame arrives for this long
    pub ws_ping_timeout: Duration,
    /// CORS origins allowed to call the HTTP API; empty allows any origin
    pub allowed_origins: Vec<String>,
    /// Insert the demo users and chats at startup
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            require_auth: true,
            ws_ping_interval: Duration::from_secs(25),
            ws_ping_timeout: Duration::from_secs(60),
            allowed_origins: Vec::new(),
            seed_demo_data: false,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("SERVER_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            config.port = parse_value("SERVER_PORT", &port)?;
        }
        config.database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if let Some(secret) = lookup("JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if let Some(flag) = lookup("REQUIRE_AUTH") {
            config.require_auth = parse_bool("REQUIRE_AUTH", &flag)?;
        }
        if let Some(secs) = lookup("WS_PING_INTERVAL_SECS") {
            config.ws_ping_interval =
                Duration::from_secs(parse_value("WS_PING_INTERVAL_SECS", &secs)?);
        }
        if let Some(secs) = lookup("WS_PING_TIMEOUT_SECS") {
            config.ws_ping_timeout =
                Duration::from_secs(parse_value("WS_PING_TIMEOUT_SECS", &secs)?);
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(flag) = lookup("SEED_DEMO_DATA") {
            config.seed_demo_data = parse_bool("SEED_DEMO_DATA", &flag)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.ws_ping_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "WS_PING_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }
        if self.ws_ping_timeout <= self.ws_ping_interval {
            return Err(ConfigError::InvalidValue {
                key: "WS_PING_TIMEOUT_SECS",
                value: self.ws_ping_timeout.as_secs().to_string(),
            });
        }
        Ok(())
    }

    /// Address the listener binds to
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "SERVER_HOST",
            value: raw,
        })
    }

    /// True when the development JWT secret is in use
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: Option<AppConfig>,
}

impl AppConfigBuilder {
    fn config(&mut self) -> &mut AppConfig {
        self.config.get_or_insert_with(AppConfig::default)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config().host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config().port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config().database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config().jwt_secret = secret.into();
        self
    }

    pub fn require_auth(mut self, require: bool) -> Self {
        self.config().require_auth = require;
        self
    }

    pub fn ws_ping_interval(mut self, interval: Duration) -> Self {
        self.config().ws_ping_interval = interval;
        self
    }

    pub fn ws_ping_timeout(mut self, timeout: Duration) -> Self {
        self.config().ws_ping_timeout = timeout;
        self
    }

    pub fn allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.config().allowed_origins = origins;
        self
    }

    pub fn seed_demo_data(mut self, seed: bool) -> Self {
        self.config().seed_demo_data = seed;
        self
    }

    /// Build the configuration
    pub fn build(mut self) -> Result<AppConfig, ConfigError> {
        let config = self.config().clone();
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
