//! Engine configuration.

use std::env;

use serde::{Deserialize, Serialize};

const DEFAULT_QUERY_CACHE_CAPACITY: usize = 1024;
const DEFAULT_SCHEMA_CACHE_CAPACITY: usize = 64;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Parsed queries kept, by query text. Zero disables the cache.
    pub query_cache_capacity: usize,
    /// Compiled schemas kept, by schema text. Zero disables the cache.
    pub schema_cache_capacity: usize,
    /// Serialize decimals as JSON strings.
    pub quote_decimals: bool,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Config {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from any key lookup; unset or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            query_cache_capacity: lookup("MPATH_QUERY_CACHE_CAPACITY")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.query_cache_capacity),
            schema_cache_capacity: lookup("MPATH_SCHEMA_CACHE_CAPACITY")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.schema_cache_capacity),
            quote_decimals: lookup("MPATH_QUOTE_DECIMALS").map_or(defaults.quote_decimals, |v| {
                matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
            }),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_cache_capacity: DEFAULT_QUERY_CACHE_CAPACITY,
            schema_cache_capacity: DEFAULT_SCHEMA_CACHE_CAPACITY,
            quote_decimals: false,
            log_level: "warn".to_owned(),
        }
    }
}
