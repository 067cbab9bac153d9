// Retry logic - fixed attempts, fixed delay
use super::constants::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY};
use super::pipeline::{CallContext, Handler, Stage};
use crate::domain::QueryOutput;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after the delay
    Retry(Duration),
    /// No attempts left, return the last error
    Exhausted,
}

/// Retry policy
///
/// Every error counts as retryable. The delay between attempts is constant:
/// no backoff and no jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_attempts` - Total number of attempts, including the first (>= 1)
    /// * `delay` - Pause between two attempts
    ///
    /// # Example
    /// ```text
    /// let policy = RetryPolicy::new(3, Duration::from_secs(1))?;
    /// ```
    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(AppError::Validation(
                "retry attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decide what happens after `attempt` (1-based) failed
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            RetryDecision::Exhausted
        } else {
            RetryDecision::Retry(self.delay)
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Re-invokes the inner handler according to a [`RetryPolicy`]
pub struct RetryStage {
    policy: RetryPolicy,
}

impl RetryStage {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

impl Stage for RetryStage {
    fn name(&self) -> &'static str {
        "retry"
    }

    fn wrap(&self, inner: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(WithRetry {
            policy: self.policy.clone(),
            inner,
        })
    }
}

struct WithRetry {
    policy: RetryPolicy,
    inner: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for WithRetry {
    async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput> {
        let call_id = ctx.call_id().to_string();
        let mut attempt = 1;

        loop {
            let err = match self.inner.call(ctx).await {
                Ok(output) => return Ok(output),
                Err(err) => err,
            };

            warn!(
                %call_id,
                attempt = %attempt,
                max_attempts = %self.policy.max_attempts,
                error = %err,
                "[Attempt {}] Error: {}",
                attempt,
                err
            );

            match self.policy.decide(attempt) {
                RetryDecision::Retry(delay) => {
                    info!(%call_id, delay_ms = %delay.as_millis(), "Retrying in {:?}", delay);
                    sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::Exhausted => {
                    error!(%call_id, attempts = %attempt, "All retry attempts failed");
                    return Err(err);
                }
            }
        }
    }
}
