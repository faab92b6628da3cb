//! Server configuration parsed from environment variables.

use std::net::SocketAddr;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "https://henr1quesantos.github.io"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("invalid listen address {0}")]
    InvalidAddr(String),
    #[error("ALLOWED_ORIGINS contains no origins")]
    EmptyOrigins,
}

/// Which browser origins may open the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub allowed_origins: AllowedOrigins,
    pub channel_capacity: usize,
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `HOST`: default `0.0.0.0`
    /// - `PORT`: default 10000
    /// - `ALLOWED_ORIGINS`: comma-separated, `*` for any
    /// - `CLIENT_CHANNEL_CAPACITY`: default 256, raised to fit the bootstrap
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unparsable port or an empty origin list.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading through `var`.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = var("HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let allowed_origins = parse_origins(var("ALLOWED_ORIGINS").as_deref())?;
        let channel_capacity = var("CLIENT_CHANNEL_CAPACITY")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CHANNEL_CAPACITY);

        Ok(Self { host, port, allowed_origins, channel_capacity })
    }

    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddr`] if `host` is not an IP literal.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddr(raw))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: AllowedOrigins::List(DEFAULT_ALLOWED_ORIGINS.iter().map(ToString::to_string).collect()),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

fn parse_origins(raw: Option<&str>) -> Result<AllowedOrigins, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Config::default().allowed_origins);
    };
    if raw.trim() == "*" {
        return Ok(AllowedOrigins::Any);
    }
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();
    if origins.is_empty() {
        return Err(ConfigError::EmptyOrigins);
    }
    Ok(AllowedOrigins::List(origins))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
