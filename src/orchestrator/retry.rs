use crate::llm::ProviderError;
use std::time::Duration;
use tokio::time::sleep;

/// Same-provider retry with exponential backoff. Never switches provider.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u8,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u8, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn max_retries(&self) -> u8 {
        self.max_retries
    }

    pub fn should_retry(&self, attempt: u8, error: &ProviderError) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        error.is_retryable()
    }

    /// Delay before retry number `attempt + 1`: `base * 2^attempt`
    pub fn delay_for(&self, attempt: u8) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt as u32);
        self.base_delay.saturating_mul(multiplier)
    }

    pub async fn wait_before_retry(&self, provider: &str, attempt: u8) {
        let delay = self.delay_for(attempt);

        tracing::info!(
            provider,
            "Retrying in {}ms (attempt {})",
            delay.as_millis(),
            attempt + 2
        );
        sleep(delay).await;
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0, Duration::from_secs(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderErrorKind;

    #[test]
    fn test_default_never_retries() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(0, &ProviderError::timeout("slow")));
    }

    #[test]
    fn test_only_transient_errors_retry() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10));
        assert!(policy.should_retry(0, &ProviderError::timeout("slow")));
        assert!(policy.should_retry(1, &ProviderError::new(ProviderErrorKind::QuotaExceeded, "429")));
        assert!(!policy.should_retry(2, &ProviderError::timeout("slow")));
        assert!(!policy.should_retry(0, &ProviderError::new(ProviderErrorKind::AuthFailure, "401")));
        assert!(!policy.should_retry(0, &ProviderError::new(ProviderErrorKind::Unknown, "boom")));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(250));
        assert_eq!(policy.delay_for(0), Duration::from_millis(250));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_secs(1));
    }
}
