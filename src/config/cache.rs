//! Cache TTL configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Cache entry lifetime configuration.
///
/// TTL expiry is the only bound on staleness anywhere in the system; there is
/// no explicit invalidation. Authorization entries use the default TTL, read
/// queries the longer query TTL.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Default TTL for cache entries, in seconds
    #[serde(default = "default_ttl")]
    pub default_ttl_secs: u64,

    /// TTL for read-query caches, in seconds
    #[serde(default = "default_query_ttl")]
    pub query_ttl_secs: u64,
}

impl CacheConfig {
    /// Get the default TTL as Duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Get the query TTL as Duration
    pub fn query_ttl(&self) -> Duration {
        Duration::from_secs(self.query_ttl_secs)
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_ttl_secs == 0 || self.query_ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheTtl);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl(),
            query_ttl_secs: default_query_ttl(),
        }
    }
}

fn default_ttl() -> u64 {
    60
}

fn default_query_ttl() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_convention() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl(), Duration::from_secs(60));
        assert_eq!(config.query_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let config = CacheConfig {
            default_ttl_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
