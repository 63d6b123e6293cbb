//! Configuration for settings manager module

use serde::Deserialize;
use std::time::Duration;

/// What `set(key, null)` does to a root key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullWritePolicy {
    /// Delete the stored record (nested keys: remove the leaf)
    #[default]
    Delete,
    /// Leave storage untouched, only drop cached entries
    ClearCache,
}

/// Settings manager configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Expose the REST routes
    #[serde(default)]
    pub enable_api: bool,

    /// Enable the settings cache
    #[serde(default = "default_true")]
    pub enable_cache: bool,

    /// Cache entry lifetime in seconds
    #[serde(default = "default_cache_expiration")]
    pub cache_expiration: u64,

    /// Behaviour of null writes
    #[serde(default)]
    pub null_write: NullWritePolicy,

    /// Listing page size when none is requested
    #[serde(default = "default_per_page")]
    pub default_per_page: u64,

    /// Largest listing page size accepted
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u64,

    /// Maximum serialized length of a value written over REST
    #[serde(default = "default_max_value_length")]
    pub max_value_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_api: false,
            enable_cache: true,
            cache_expiration: default_cache_expiration(),
            null_write: NullWritePolicy::default(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            max_value_length: default_max_value_length(),
        }
    }
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expiration)
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_expiration() -> u64 {
    86_400 // 1 day
}

fn default_per_page() -> u64 {
    10
}

fn default_max_per_page() -> u64 {
    100
}

fn default_max_value_length() -> usize {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert!(!cfg.enable_api);
        assert!(cfg.enable_cache);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(86_400));
        assert_eq!(cfg.null_write, NullWritePolicy::Delete);
        assert_eq!(cfg.max_per_page, 100);
    }

    #[test]
    fn test_deserialize_partial() {
        let cfg: Config = serde_json::from_value(serde_json::json!({
            "enable_cache": false,
            "cache_expiration": 60,
            "null_write": "clear_cache"
        }))
        .unwrap();
        assert!(!cfg.enable_cache);
        assert_eq!(cfg.cache_expiration, 60);
        assert_eq!(cfg.null_write, NullWritePolicy::ClearCache);
        assert_eq!(cfg.default_per_page, 10);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<Config, _> =
            serde_json::from_value(serde_json::json!({"enable_cahce": true}));
        assert!(result.is_err());
    }
}
