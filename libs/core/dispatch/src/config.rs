use core_config::{env_or_default, ConfigError, FromEnv};
use std::time::Duration;

/// Process-wide dispatch-pipeline tunables (governing design document §6).
/// Threaded explicitly into pollers, the retry path, and the worker pool
/// rather than read ad hoc from the environment at the call site.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub high_poll_interval: Duration,
    pub medium_poll_interval: Duration,
    pub low_poll_interval: Duration,
    pub batch_size: usize,
    pub max_retries: u32,
    pub base_backoff_secs: u64,
    pub pool_size: usize,
}

impl DispatchConfig {
    /// Backoff delay for a retry attempt number (1-based): `BASE * 2^retries`.
    pub fn backoff_for(&self, retries: u32) -> Duration {
        let secs = self.base_backoff_secs.saturating_mul(1u64 << retries.min(32));
        Duration::from_secs(secs)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            high_poll_interval: Duration::from_secs(3),
            medium_poll_interval: Duration::from_secs(30),
            low_poll_interval: Duration::from_secs(300),
            batch_size: 10_000,
            max_retries: 5,
            base_backoff_secs: 5,
            pool_size: 50,
        }
    }
}

impl FromEnv for DispatchConfig {
    /// Environment variables, all optional with reference-value defaults:
    /// `HIGH_POLL_INTERVAL_SECS`, `MEDIUM_POLL_INTERVAL_SECS`,
    /// `LOW_POLL_INTERVAL_SECS`, `BATCH_SIZE`, `MAX_RETRIES`,
    /// `BASE_BACKOFF_SEC`, `POOL_SIZE`.
    fn from_env() -> Result<Self, ConfigError> {
        let parse_u64 = |key: &str, default: &str| -> Result<u64, ConfigError> {
            env_or_default(key, default)
                .parse()
                .map_err(|e| ConfigError::ParseError {
                    key: key.to_string(),
                    details: format!("{}", e),
                })
        };
        let parse_usize = |key: &str, default: &str| -> Result<usize, ConfigError> {
            env_or_default(key, default)
                .parse()
                .map_err(|e| ConfigError::ParseError {
                    key: key.to_string(),
                    details: format!("{}", e),
                })
        };
        let parse_u32 = |key: &str, default: &str| -> Result<u32, ConfigError> {
            env_or_default(key, default)
                .parse()
                .map_err(|e| ConfigError::ParseError {
                    key: key.to_string(),
                    details: format!("{}", e),
                })
        };

        Ok(Self {
            high_poll_interval: Duration::from_secs(parse_u64("HIGH_POLL_INTERVAL_SECS", "3")?),
            medium_poll_interval: Duration::from_secs(parse_u64(
                "MEDIUM_POLL_INTERVAL_SECS",
                "30",
            )?),
            low_poll_interval: Duration::from_secs(parse_u64("LOW_POLL_INTERVAL_SECS", "300")?),
            batch_size: parse_usize("BATCH_SIZE", "10000")?,
            max_retries: parse_u32("MAX_RETRIES", "5")?,
            base_backoff_secs: parse_u64("BASE_BACKOFF_SEC", "5")?,
            pool_size: parse_usize("POOL_SIZE", "50")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = DispatchConfig::default();
        assert_eq!(config.high_poll_interval, Duration::from_secs(3));
        assert_eq!(config.medium_poll_interval, Duration::from_secs(30));
        assert_eq!(config.low_poll_interval, Duration::from_secs(300));
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.pool_size, 50);
    }

    #[test]
    fn backoff_ladder_matches_reference_delays() {
        let config = DispatchConfig::default();
        assert_eq!(config.backoff_for(1), Duration::from_secs(10));
        assert_eq!(config.backoff_for(2), Duration::from_secs(20));
        assert_eq!(config.backoff_for(3), Duration::from_secs(40));
        assert_eq!(config.backoff_for(4), Duration::from_secs(80));
        assert_eq!(config.backoff_for(5), Duration::from_secs(160));
    }

    #[test]
    fn from_env_honors_overrides() {
        temp_env::with_vars(
            [
                ("BATCH_SIZE", Some("25")),
                ("MAX_RETRIES", Some("7")),
                ("POOL_SIZE", Some("10")),
            ],
            || {
                let config = DispatchConfig::from_env().unwrap();
                assert_eq!(config.batch_size, 25);
                assert_eq!(config.max_retries, 7);
                assert_eq!(config.pool_size, 10);
            },
        );
    }

    #[test]
    fn from_env_rejects_invalid_values() {
        temp_env::with_var("BATCH_SIZE", Some("not-a-number"), || {
            let err = DispatchConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("BATCH_SIZE"));
        });
    }
}
