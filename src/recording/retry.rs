//! Retry policy with linear backoff for transient recording-fetch failures.
//!
//! Only server-side HTTP errors (status >= 500) are transient: the server
//! answered, so a later attempt may succeed. Everything else - no response
//! at all, 4xx statuses, undecodable bodies - is terminal on the first
//! attempt.

use std::time::Duration;

use tracing::debug;

use crate::api::ApiError;

/// Default maximum attempts per recording (including the initial attempt).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay for linear backoff (3 seconds).
pub const BASE_DELAY: Duration = Duration::from_millis(3000);

/// Decision on whether to retry a failed recording fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// The attempt number the retry will be (1-indexed).
        attempt: u32,
    },
    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with linear backoff.
///
/// Delay grows linearly with the attempt number:
///
/// ```text
/// delay = base_delay * attempt
/// ```
///
/// With defaults, the sleeps before attempts 2 and 3 are 3s and 6s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,
    /// Delay multiplier base.
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy with custom settings.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Creates a policy with custom `max_attempts` and the default delay.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the configured maximum number of attempts.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The backoff delay slept after failed attempt `attempt` (1-indexed).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Decides whether a failed attempt should be retried.
    ///
    /// `attempt` is the attempt number that just failed (1-indexed).
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> RetryDecision {
        if !is_transient(error) {
            return RetryDecision::DoNotRetry {
                reason: "non-transient failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            delay: self.delay_for(attempt),
            attempt: attempt + 1,
        }
    }
}

/// Whether an API error may succeed on retry.
///
/// Transient means the server answered with a 5xx status. A missing
/// response (network error) or any 4xx is terminal, matching the observed
/// service behavior: its transient faults always surface as 5xx.
#[must_use]
pub fn is_transient(error: &ApiError) -> bool {
    matches!(error.http_status(), Some(status) if status >= 500)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn http(status: u16) -> ApiError {
        ApiError::http("/cmd/downloadgravacao", status)
    }

    // ==================== Delay Calculation Tests ====================

    #[test]
    fn test_delay_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(3000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(6000));
    }

    #[test]
    fn test_delay_uses_custom_base() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        assert_eq!(policy.delay_for(1), Duration::from_millis(10));
        assert_eq!(policy.delay_for(2), Duration::from_millis(20));
    }

    // ==================== Classification Tests ====================

    #[test]
    fn test_5xx_is_transient() {
        assert!(is_transient(&http(500)));
        assert!(is_transient(&http(502)));
        assert!(is_transient(&http(503)));
        assert!(is_transient(&http(504)));
    }

    #[test]
    fn test_4xx_is_not_transient() {
        assert!(!is_transient(&http(400)));
        assert!(!is_transient(&http(404)));
        assert!(!is_transient(&http(429)));
    }

    #[test]
    fn test_decode_error_is_not_transient() {
        let decode_err = serde_json::from_str::<i64>("{").unwrap_err();
        assert!(!is_transient(&ApiError::decode("/x", decode_err)));
    }

    // ==================== Should Retry Decision Tests ====================

    #[test]
    fn test_should_retry_5xx_before_max_attempts() {
        let policy = RetryPolicy::default();

        let decision = policy.should_retry(&http(503), 1);
        assert_eq!(
            decision,
            RetryDecision::Retry {
                delay: Duration::from_millis(3000),
                attempt: 2,
            }
        );

        let decision = policy.should_retry(&http(503), 2);
        assert_eq!(
            decision,
            RetryDecision::Retry {
                delay: Duration::from_millis(6000),
                attempt: 3,
            }
        );
    }

    #[test]
    fn test_should_not_retry_5xx_on_final_attempt() {
        let policy = RetryPolicy::default();
        let decision = policy.should_retry(&http(503), 3);
        assert!(matches!(decision, RetryDecision::DoNotRetry { .. }));
        if let RetryDecision::DoNotRetry { reason } = decision {
            assert!(reason.contains("exhausted"));
        }
    }

    #[test]
    fn test_should_not_retry_4xx() {
        let policy = RetryPolicy::default();
        let decision = policy.should_retry(&http(404), 1);
        assert!(matches!(decision, RetryDecision::DoNotRetry { .. }));
    }

    #[test]
    fn test_max_attempts_minimum_is_one() {
        let policy = RetryPolicy::with_max_attempts(0);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_MAX_RETRIES, 3);
        assert_eq!(BASE_DELAY, Duration::from_millis(3000));
    }
}
