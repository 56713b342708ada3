//! Retry logic for provider calls.
//!
//! Provider calls get a small, fixed number of attempts with a fixed pause
//! between them. Each attempt is bounded by a timeout; an elapsed timeout
//! counts as a transient failure. Only transient failures are retried.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::ai::{ProviderError, TransientKind};

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,

    /// Fixed delay before each retry.
    pub backoff: Duration,

    /// Timeout for each individual attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(500),
            attempt_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries (fail fast).
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, ..Default::default() }
    }

    /// Create a config for tests and local fakes.
    pub fn quick() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(1),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

/// Result of a retry operation.
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The final result (success or last error).
    pub result: Result<T, ProviderError>,

    /// Number of attempts made.
    pub attempts: u32,

    /// Total time spent (including delays).
    pub total_time: Duration,
}

impl<T> RetryResult<T> {
    /// Get the result.
    pub fn into_result(self) -> Result<T, ProviderError> {
        self.result
    }
}

/// Run a provider call with per-attempt timeout and transient-only retries.
pub async fn retry_transient<T, F, Fut>(config: &RetryConfig, mut operation: F) -> RetryResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let start = Instant::now();
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let result = match tokio::time::timeout(config.attempt_timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::transient(
                TransientKind::Timeout,
                format!("no response within {}s", config.attempt_timeout.as_secs_f32()),
            )),
        };

        match result {
            Err(ref e) if e.is_transient() && attempts < max_attempts => {
                warn!(attempt = attempts, error = %e, "Transient provider failure, retrying");
                tokio::time::sleep(config.backoff).await;
            }
            result => {
                debug!(attempts, ok = result.is_ok(), "Provider call finished");
                return RetryResult { result, attempts, total_time: start.elapsed() };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::ai::PermanentKind;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.attempt_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_retry_config_no_retry() {
        assert_eq!(RetryConfig::no_retry().max_attempts, 1);
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let result = retry_transient(&RetryConfig::quick(), || async { Ok("done") }).await;

        assert!(result.result.is_ok());
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn test_transient_then_success() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(&RetryConfig::quick(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ProviderError::transient(TransientKind::RateLimited, "slow down"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.attempts, 2);
        assert_eq!(result.into_result().unwrap(), "done");
    }

    #[tokio::test]
    async fn test_transient_exhausts_attempts() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(&RetryConfig::quick(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ProviderError::transient(TransientKind::ServerError, "502")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(result.into_result().unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn test_permanent_not_retried() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(&RetryConfig::quick(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ProviderError::permanent(PermanentKind::Auth, "bad key")) }
        })
        .await;

        assert_eq!(result.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_transient_and_retried() {
        let config = RetryConfig {
            max_attempts: 2,
            backoff: Duration::from_millis(10),
            attempt_timeout: Duration::from_secs(1),
        };
        let calls = AtomicU32::new(0);
        let result = retry_transient(&config, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, ProviderError>("late")
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(
            result.into_result(),
            Err(ProviderError::Transient(TransientKind::Timeout, _))
        ));
    }
}
