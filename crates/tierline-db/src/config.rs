//! Store configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pool::DbConfig;

/// Largest page size the admin listing accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Tierline storage and service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Shop the services operate on
    pub shop_id: String,

    /// Storefront payload cache lifetime in hours
    pub cache_ttl_hours: i64,

    /// Default admin listing page size (1..=100)
    pub page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: PathBuf::from("./tierline.db"),
            max_connections: 5,
            shop_id: "default-shop".to_string(),
            cache_ttl_hours: 24,
            page_size: 10,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();

        let config = StoreConfig {
            database_path: lookup("TIERLINE_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(&lookup, "TIERLINE_DB_MAX_CONNECTIONS", defaults.max_connections)?,

            shop_id: lookup("TIERLINE_SHOP_ID")
                .filter(|shop| !shop.trim().is_empty())
                .unwrap_or(defaults.shop_id),

            cache_ttl_hours: parse_or(&lookup, "TIERLINE_CACHE_TTL_HOURS", defaults.cache_ttl_hours)?,

            page_size: parse_or(&lookup, "TIERLINE_PAGE_SIZE", defaults.page_size)?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("TIERLINE_DB_MAX_CONNECTIONS".to_string()));
        }

        if config.cache_ttl_hours < 0 {
            return Err(ConfigError::InvalidValue("TIERLINE_CACHE_TTL_HOURS".to_string()));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&config.page_size) {
            return Err(ConfigError::OutOfRange {
                key: "TIERLINE_PAGE_SIZE".to_string(),
                min: 1,
                max: i64::from(MAX_PAGE_SIZE),
            });
        }

        Ok(config)
    }

    /// Pool configuration for this store.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("{key} must be between {min} and {max}")]
    OutOfRange { key: String, min: i64, max: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("./tierline.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.shop_id, "default-shop");
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("TIERLINE_DATABASE_PATH", "/tmp/t.db"),
            ("TIERLINE_SHOP_ID", "acme.myshopify.com"),
            ("TIERLINE_PAGE_SIZE", "25"),
            ("TIERLINE_CACHE_TTL_HOURS", "1"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/t.db"));
        assert_eq!(config.shop_id, "acme.myshopify.com");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.cache_ttl_hours, 1);
        assert_eq!(config.db_config().max_connections, 5);
    }

    #[test]
    fn test_unparsable_value() {
        let err = StoreConfig::from_lookup(lookup(&[("TIERLINE_DB_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "TIERLINE_DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(StoreConfig::from_lookup(lookup(&[("TIERLINE_PAGE_SIZE", "0")])).is_err());
        assert!(StoreConfig::from_lookup(lookup(&[("TIERLINE_PAGE_SIZE", "101")])).is_err());
        assert!(StoreConfig::from_lookup(lookup(&[("TIERLINE_PAGE_SIZE", "100")])).is_ok());
    }
}
