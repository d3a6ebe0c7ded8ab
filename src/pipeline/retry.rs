//! Retry ceiling and backoff for synthesis calls.

use std::time::Duration;

use crate::tts::ProviderError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,        // Total attempts, first call included
    pub rate_limit_wait: Duration, // Multiplied by the attempt number
    pub retry_delay: Duration,     // Flat wait for other retryable errors
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, rate_limit_wait: Duration::from_secs(60), retry_delay: Duration::from_secs(5) }
    }
}

impl RetryPolicy {
    /// Whether another attempt follows failed attempt number `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32, error: &ProviderError) -> bool {
        error.is_retryable() && attempt < self.max_attempts
    }

    /// Wait before the attempt after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32, error: &ProviderError) -> Duration {
        if error.is_rate_limit() { self.rate_limit_wait * attempt } else { self.retry_delay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_backoff_escalates() {
        let policy = RetryPolicy::default();
        let err = ProviderError::RateLimited("429".into());
        assert_eq!(policy.backoff(1, &err), Duration::from_secs(60));
        assert_eq!(policy.backoff(2, &err), Duration::from_secs(120));
    }

    #[test]
    fn test_other_errors_wait_flat() {
        let policy = RetryPolicy::default();
        let err = ProviderError::Transport("reset".into());
        assert_eq!(policy.backoff(1, &err), policy.backoff(2, &err));
        assert_eq!(policy.backoff(1, &err), Duration::from_secs(5));
    }

    #[test]
    fn test_ceiling_and_terminal_errors() {
        let policy = RetryPolicy::default();
        let err = ProviderError::Empty("no parts".into());
        assert!(policy.should_retry(1, &err));
        assert!(policy.should_retry(2, &err));
        assert!(!policy.should_retry(3, &err));

        let rejected = ProviderError::Rejected { status: 401, body: String::new() };
        assert!(!policy.should_retry(1, &rejected));
    }
}
