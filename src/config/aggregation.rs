//! Aggregation limits

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Row caps, trend length and snapshot caching.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    /// Rows read per collection for the submission listing
    #[serde(default = "default_list_row_cap")]
    pub list_row_cap: u32,

    /// Most recent buckets kept in 90-day and all-time trend series
    #[serde(default = "default_trend_bucket_cap")]
    pub trend_bucket_cap: usize,

    /// Dashboard snapshot cache lifetime; 0 disables caching
    #[serde(default)]
    pub cache_ttl_secs: u64,

    /// Most snapshots the cache holds at once
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,
}

impl AggregationConfig {
    /// Snapshot cache TTL, or `None` when caching is off.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=5_000).contains(&self.list_row_cap) {
            return Err(ValidationError::LimitOutOfRange {
                field: "list_row_cap",
                min: 1,
                max: 5_000,
            });
        }
        if !(1..=366).contains(&self.trend_bucket_cap) {
            return Err(ValidationError::LimitOutOfRange {
                field: "trend_bucket_cap",
                min: 1,
                max: 366,
            });
        }
        if self.cache_ttl_secs > 3_600 {
            return Err(ValidationError::LimitOutOfRange {
                field: "cache_ttl_secs",
                min: 0,
                max: 3_600,
            });
        }
        if !(1..=1_000_000).contains(&self.cache_max_entries) {
            return Err(ValidationError::LimitOutOfRange {
                field: "cache_max_entries",
                min: 1,
                max: 1_000_000,
            });
        }
        Ok(())
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            list_row_cap: default_list_row_cap(),
            trend_bucket_cap: default_trend_bucket_cap(),
            cache_ttl_secs: 0,
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

fn default_list_row_cap() -> u32 {
    200
}

fn default_trend_bucket_cap() -> usize {
    14
}

fn default_cache_max_entries() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AggregationConfig::default();
        assert_eq!(config.list_row_cap, 200);
        assert_eq!(config.trend_bucket_cap, 14);
        assert_eq!(config.cache_ttl(), None);
        assert_eq!(config.cache_max_entries, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cache_ttl_enabled() {
        let config = AggregationConfig {
            cache_ttl_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_row_cap_is_invalid() {
        let config = AggregationConfig {
            list_row_cap: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::LimitOutOfRange { field: "list_row_cap", .. })
        ));
    }

    #[test]
    fn test_zero_cache_capacity_is_invalid() {
        let config = AggregationConfig {
            cache_ttl_secs: 30,
            cache_max_entries: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::LimitOutOfRange { field: "cache_max_entries", .. })
        ));
    }

    #[test]
    fn test_zero_bucket_cap_is_invalid() {
        let config = AggregationConfig {
            trend_bucket_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
