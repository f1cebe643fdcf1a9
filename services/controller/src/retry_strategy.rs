use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use shared::errors::ServiceError;
use shared::{RETRY_BACKOFF_BASE_MS, RETRY_BACKOFF_MAX_MS};
use std::time::Duration;

/// Retry policy for idempotent calls (the session handshake).
///
/// Settlement requests are never retried: a play is sent exactly once.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    max_retries: u32,
}

impl RetryStrategy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(RETRY_BACKOFF_BASE_MS))
            .with_max_interval(Duration::from_millis(RETRY_BACKOFF_MAX_MS))
            .with_multiplier(2.0)
            .with_max_elapsed_time(None)
            .build()
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    pub fn is_retryable_error(&self, error: &ServiceError) -> bool {
        error.is_transient()
    }
}
