use std::env;
use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
    #[error("{name} must be at least {min} bytes long")]
    TooShort { name: &'static str, min: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// PostgreSQL when set, the in-memory store otherwise.
    pub database_url: Option<String>,
    pub body_limit: usize,
    pub static_dir: String,
    /// Signs the session cookie; a random key is used when unset.
    pub session_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            body_limit: 10 * 1024 * 1024,
            static_dir: "static".to_string(),
            session_secret: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: value("HOST").unwrap_or(defaults.host),
            port: parse("PORT", value("PORT"))?.unwrap_or(defaults.port),
            database_url: value("DATABASE_URL"),
            body_limit: parse("BODY_LIMIT_BYTES", value("BODY_LIMIT_BYTES"))?
                .unwrap_or(defaults.body_limit),
            static_dir: value("STATIC_DIR").unwrap_or(defaults.static_dir),
            session_secret: secret("SESSION_SECRET", value("SESSION_SECRET"))?,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            value: self.host.clone(),
        })
    }
}

const MIN_SECRET_LEN: usize = 64;

fn secret(name: &'static str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.len() < MIN_SECRET_LEN => Err(ConfigError::TooShort {
            name,
            min: MIN_SECRET_LEN,
        }),
        other => Ok(other),
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value: v })
        })
        .transpose()
}
