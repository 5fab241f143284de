//! Timeout and retry policy for backend reads
//!
//! Every attempt is bounded by the configured request timeout. Failed
//! attempts retry only for retryable errors (network, timeout), with a
//! linearly growing backoff between attempts. Writes never come through
//! here; a write that failed in transit may still have landed.

use crate::config::Config;
use shared::{AppError, AppResult};
use std::future::Future;

/// Run an idempotent read with per-attempt timeout and bounded retries
pub async fn retry_read<T, F, Fut>(config: &Config, op_name: &'static str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let max_attempts = config.max_read_retries + 1;
    let mut attempt = 0;

    loop {
        attempt += 1;

        let result = match tokio::time::timeout(config.request_timeout(), op()).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(format!(
                "{op_name} timed out after {}ms",
                config.request_timeout_ms
            ))),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                tracing::warn!(
                    op = op_name,
                    attempt,
                    max_attempts,
                    error = %err,
                    "Read attempt failed, retrying"
                );
                tokio::time::sleep(config.backoff_for_attempt(attempt)).await;
            }
            Err(err) => {
                if attempt > 1 {
                    tracing::warn!(op = op_name, attempt, error = %err, "Read failed, giving up");
                }
                return Err(err);
            }
        }
    }
}
