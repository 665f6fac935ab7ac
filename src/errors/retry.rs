use std::future::Future;
use std::time::Duration;

use super::types::AuditError;
use tracing::warn;

/// Retry configuration for external model calls.
///
/// The delay schedule is linear: after the n-th failed attempt (1-indexed)
/// the caller sleeps `n * base_delay` before trying again.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the given failed attempt (1-indexed).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Execute an async operation with bounded linear-backoff retry.
///
/// Retries only while the error is classified as retryable. A non-retryable
/// error fails immediately; exhausting `max_retries` returns the last error.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    config: &RetryConfig,
    mut factory: F,
) -> Result<T, AuditError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AuditError>>,
{
    let max_attempts = config.max_retries.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match factory().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let classification = e.classify();

                if !classification.retryable || attempt >= max_attempts {
                    if !classification.retryable {
                        warn!(
                            operation = operation_name,
                            error_type = classification.error_type,
                            "Non-retryable error, failing immediately"
                        );
                        return Err(e);
                    }
                    warn!(
                        operation = operation_name,
                        attempt,
                        max = max_attempts,
                        "Max retries exhausted"
                    );
                    return Err(e);
                }

                let delay = config.delay_after(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    max = max_attempts,
                    error_type = classification.error_type,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after error"
                );

                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AuditError::Internal("Retry loop exited unexpectedly".into())))
}
