//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use database::Database;
use swap_core::service::DEFAULT_TYPING_TTL;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// How long a typing indicator stays visible.
    pub typing_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SKILLSWAP_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:skillswap.db?mode=rwc` |
    /// | `SKILLSWAP_DB_POOL_SIZE` | Database pool size | `20` |
    /// | `SKILLSWAP_TYPING_TTL_SECS` | Typing indicator lifetime in seconds | `3` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("SKILLSWAP_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = lookup("SQLITE_PATH")
            .unwrap_or_else(|| "sqlite:skillswap.db?mode=rwc".to_string());

        let pool_size = match lookup("SKILLSWAP_DB_POOL_SIZE") {
            Some(value) => parse_positive("SKILLSWAP_DB_POOL_SIZE", &value)?,
            None => Database::DEFAULT_POOL_SIZE,
        };

        let typing_ttl = match lookup("SKILLSWAP_TYPING_TTL_SECS") {
            Some(value) => Duration::from_secs(u64::from(parse_positive("SKILLSWAP_TYPING_TTL_SECS", &value)?)),
            None => DEFAULT_TYPING_TTL,
        };

        Ok(Self {
            addr,
            database_url,
            pool_size,
            typing_ttl,
        })
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid SKILLSWAP_ADDR format")]
    InvalidAddr,

    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8790");
        assert_eq!(config.database_url, "sqlite:skillswap.db?mode=rwc");
        assert_eq!(config.pool_size, 20);
        assert_eq!(config.typing_ttl, Duration::from_secs(3));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SKILLSWAP_ADDR", "0.0.0.0:9000"),
            ("SQLITE_PATH", "sqlite::memory:"),
            ("SKILLSWAP_DB_POOL_SIZE", "4"),
            ("SKILLSWAP_TYPING_TTL_SECS", "10"),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.typing_ttl, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("SKILLSWAP_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddr)
        ));
        assert!(matches!(
            config_from(&[("SKILLSWAP_DB_POOL_SIZE", "0")]),
            Err(ConfigError::InvalidNumber { name: "SKILLSWAP_DB_POOL_SIZE", .. })
        ));
        assert!(matches!(
            config_from(&[("SKILLSWAP_TYPING_TTL_SECS", "soon")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }
}
