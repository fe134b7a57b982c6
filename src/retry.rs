//! Exponential backoff for the HTTP fetches of the content tooling.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How often and how patiently to retry a fetch.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts in total, the first one included
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_delay: Duration,
    /// Cap on any single wait
    pub max_delay: Duration,
    /// Growth of the wait after each failure
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Doubling backoff starting at `initial_delay`, capped at 30s.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Wiki pages during `check-ref-link`: one retry after 500ms.
    /// Hundreds of pages are checked per run, so failures stay cheap.
    pub fn ref_page() -> Self {
        Self::new(2, Duration::from_millis(500)).with_max_delay(Duration::from_secs(2))
    }

    /// Single data file downloads: waits of 1s then 2s.
    pub fn remote_file() -> Self {
        Self::new(3, Duration::from_secs(1)).with_max_delay(Duration::from_secs(5))
    }

    /// Wait before retry number `retry` (1-based).
    fn backoff(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        Duration::from_millis(millis as u64).min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects its error, or
/// `config.max_attempts` is used up. The last error is returned.
///
/// # Panics
/// Panics if `config.max_attempts` is 0
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    what: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    assert!(
        config.max_attempts >= 1,
        "RetryConfig.max_attempts must be >= 1, got {}",
        config.max_attempts
    );

    let mut attempt = 1;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{}: ok on attempt {}", what, attempt);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !should_retry(&err) {
            debug!("{}: giving up, not retryable: {}", what, err);
            return Err(err);
        }
        if attempt >= config.max_attempts {
            warn!("{}: failed {} times, last error: {}", what, attempt, err);
            return Err(err);
        }

        let delay = config.backoff(attempt);
        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            what, attempt, config.max_attempts, err, delay
        );
        sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use thiserror::Error;

    /// Stand-in for an HTTP failure.
    #[derive(Debug, Error, PartialEq)]
    #[error("HTTP {0}")]
    struct Status(u16);

    fn server_errors_only(e: &Status) -> bool {
        e.0 >= 500
    }

    fn quick(attempts: u32) -> RetryConfig {
        RetryConfig::new(attempts, Duration::from_millis(1))
    }

    // ==================== Backoff ====================

    #[test]
    fn test_remote_file_waits() {
        let config = RetryConfig::remote_file();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff(1), Duration::from_secs(1));
        assert_eq!(config.backoff(2), Duration::from_secs(2));
        // Never reached with 3 attempts, but stays under the cap
        assert_eq!(config.backoff(5), Duration::from_secs(5));
    }

    #[test]
    fn test_ref_page_retries_once() {
        let config = RetryConfig::ref_page();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.backoff(1), Duration::from_millis(500));
    }

    #[test]
    fn test_backoff_doubles() {
        let config = RetryConfig::new(4, Duration::from_millis(100));
        assert_eq!(config.backoff(3), Duration::from_millis(400));
    }

    // ==================== Predicate ====================

    #[tokio::test]
    async fn test_server_error_then_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry_if(
            &quick(3),
            "page",
            || async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(Status(503)),
                    _ => Ok("<html>"),
                }
            },
            server_errors_only,
        )
        .await;

        assert_eq!(result, Ok("<html>"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), Status> = with_retry_if(
            &quick(3),
            "page",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Status(404))
            },
            server_errors_only,
        )
        .await;

        assert_eq!(result, Err(Status(404)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_persistent_server_error_uses_every_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), Status> = with_retry_if(
            &quick(2),
            "page",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Status(502))
            },
            server_errors_only,
        )
        .await;

        assert_eq!(result, Err(Status(502)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    #[should_panic(expected = "max_attempts must be >= 1")]
    async fn test_zero_attempts_panics() {
        let _: Result<(), Status> =
            with_retry_if(&quick(0), "page", || async { Ok(()) }, server_errors_only).await;
    }
}
