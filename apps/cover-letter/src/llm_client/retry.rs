use std::time::Duration;

use crate::errors::ProviderError;

/// Exponential backoff for transient provider failures (timeouts, connection drops).
/// Anything else fails on the first attempt.
///
/// Applied per request: a retried request starts again from its first stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; `1` means no retry.
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_secs(1),
        }
    }

    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, 5),
            ..Self::disabled()
        }
    }

    /// Delay before retry number `retry` (1-based): 1s, 2s, 4s, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay * (1u32 << retry.saturating_sub(1).min(16))
    }

    /// How long to wait before another attempt after attempt `attempt` (1-based)
    /// failed with `error`. `None` when the failure is final.
    pub fn retry_after(&self, attempt: u32, error: &ProviderError) -> Option<Duration> {
        (error.is_transient() && attempt < self.max_attempts).then(|| self.delay_for(attempt))
    }
}
