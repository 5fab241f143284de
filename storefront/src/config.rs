//! Service configuration
//!
//! # Environment variables
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | WORK_DIR | ./storefront-data | Directory for the local cart database |
//! | REQUEST_TIMEOUT_MS | 30000 | Per-attempt bound on backend reads |
//! | MAX_READ_RETRIES | 2 | Automatic retries after the first read attempt |
//! | RETRY_BACKOFF_MS | 2000 | Base delay; grows linearly per attempt |
//! | ENVIRONMENT | development | Runtime environment name |

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the local cart snapshot database
    pub work_dir: String,
    /// Per-attempt timeout for backend read operations (milliseconds)
    pub request_timeout_ms: u64,
    /// Additional automatic attempts for idempotent reads
    pub max_read_retries: u32,
    /// Base backoff delay; attempt N waits N * base (milliseconds)
    pub retry_backoff_ms: u64,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load `.env` if present, then read configuration from the environment
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Read configuration from environment variables, using defaults for
    /// anything unset or unparseable
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./storefront-data".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
            max_read_retries: std::env::var("MAX_READ_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            retry_backoff_ms: std::env::var("RETRY_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2_000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Backoff before retry attempt `attempt` (1-based), growing linearly
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms * u64::from(attempt))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "./storefront-data".into(),
            request_timeout_ms: 30_000,
            max_read_retries: 2,
            retry_backoff_ms: 2_000,
            environment: "development".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.max_read_retries, 2);
        assert_eq!(config.retry_backoff_ms, 2_000);
    }

    #[test]
    fn test_linear_backoff() {
        let config = Config::default();
        assert_eq!(config.backoff_for_attempt(1), Duration::from_millis(2_000));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_millis(4_000));
        assert_eq!(config.backoff_for_attempt(3), Duration::from_millis(6_000));
    }
}
