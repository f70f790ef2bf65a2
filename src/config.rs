use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::store::DEFAULT_STORE_TIMEOUT;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has invalid value {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process-wide settings, read once at startup and passed down explicitly.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    /// Symmetric signing secret for access tokens.
    pub jwt_secret: String,
    /// Lifetime of every access token issued by this process.
    pub token_ttl: Duration,
    /// Upper bound for each storage operation and for acquiring a connection.
    pub store_timeout: Duration,
    pub max_connections: u32,
    pub bcrypt_cost: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("token_ttl", &self.token_ttl)
            .field("store_timeout", &self.store_timeout)
            .field("max_connections", &self.max_connections)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key: &str| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let ttl_hours: u64 = parsed(&lookup, "TOKEN_TTL_HOURS", 24)?;
        let timeout_secs: u64 =
            parsed(&lookup, "STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT.as_secs())?;
        let bcrypt_cost: u32 = parsed(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;

        if ttl_hours == 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                value: ttl_hours.to_string(),
            });
        }
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "STORE_TIMEOUT_SECS",
                value: timeout_secs.to_string(),
            });
        }
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        Ok(Self {
            database_url: required(&lookup, "DATABASE_URL")?,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            server_port: parsed(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            token_ttl: Duration::from_secs(ttl_hours.saturating_mul(60 * 60)),
            store_timeout: Duration::from_secs(timeout_secs),
            max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
