//! Bounded retry decorator for LLM providers
//!
//! Wraps any provider and re-issues a failed call when the error is transient
//! (`LlmError::is_retryable`). With `max_attempts = 1` the wrapper is a
//! pass-through, which is the default: one best-effort attempt per call.

use super::{CompletionParams, LlmError, LlmProvider, LlmResponse, Message};
use crate::config::RetryConfig;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct RetryingProvider {
    inner: Arc<dyn LlmProvider>,
    policy: RetryConfig,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, policy: RetryConfig) -> Self {
        Self { inner, policy }
    }

    /// Delay before attempt `attempt + 1` (attempts are 1-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let ms = self
            .policy
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.policy.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

#[async_trait]
impl LlmProvider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn chat(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<LlmResponse, LlmError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.chat(messages, params).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        provider = self.inner.name(),
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "LLM call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
