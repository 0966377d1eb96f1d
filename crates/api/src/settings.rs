//! Process configuration from environment variables.

use std::net::SocketAddr;

use thiserror::Error;
use webmvc_observability::LogFormat;

pub const BIND_ADDR_VAR: &str = "WEBMVC_BIND_ADDR";
pub const UNIFORM_RESPONSE_VAR: &str = "WEBMVC_UNIFORM_RESPONSE";
pub const LOG_FORMAT_VAR: &str = "WEBMVC_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid socket address `{value}`")]
    InvalidBindAddr { var: &'static str, value: String },

    #[error("{var}: expected a boolean, got `{value}`")]
    InvalidFlag { var: &'static str, value: String },

    #[error("{var}: expected `json` or `text`, got `{value}`")]
    InvalidLogFormat { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Wrap body-annotated responses in `{status, data}`.
    pub uniform_response: bool,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            uniform_response: true,
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr { var: BIND_ADDR_VAR, value })?;
        }

        if let Some(value) = lookup(UNIFORM_RESPONSE_VAR) {
            config.uniform_response = parse_flag(&value)
                .ok_or(ConfigError::InvalidFlag { var: UNIFORM_RESPONSE_VAR, value })?;
        }

        if let Some(value) = lookup(LOG_FORMAT_VAR) {
            config.log_format = LogFormat::parse(&value)
                .ok_or(ConfigError::InvalidLogFormat { var: LOG_FORMAT_VAR, value })?;
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
