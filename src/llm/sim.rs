//! Simulation provider - scripted LLM for tests and offline runs
//!
//! Registered as provider "sim". No API key required. Replies come from a
//! script of steps (text or a typed failure); once the script is exhausted
//! every call answers `SIM_OUTPUT_<n>` where `n` is the 1-based call number.
//! Every call is recorded so tests can assert what each stage received.

use super::{CompletionParams, LlmError, LlmProvider, LlmResponse, Message, Role, TokenUsage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum SimStep {
    Reply(String),
    Fail(SimFailure),
}

/// Failure kinds the simulator can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFailure {
    Network,
    ServiceError,
    RateLimited,
    Unauthorized,
    Malformed,
}

impl SimFailure {
    fn into_error(self) -> LlmError {
        match self {
            SimFailure::Network => LlmError::Network("simulated connection reset".to_string()),
            SimFailure::ServiceError => {
                LlmError::ServiceError("simulated 503 Service Unavailable".to_string())
            }
            SimFailure::RateLimited => LlmError::RateLimited("simulated quota".to_string()),
            SimFailure::Unauthorized => LlmError::Unauthorized("simulated bad key".to_string()),
            SimFailure::Malformed => {
                LlmError::MalformedResponse("simulated empty choices".to_string())
            }
        }
    }
}

/// What the simulator received on one call
#[derive(Debug, Clone)]
pub struct SimCall {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub params: CompletionParams,
}

#[derive(Default)]
pub struct SimProvider {
    script: Mutex<VecDeque<SimStep>>,
    calls: Mutex<Vec<SimCall>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SimProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(steps: impl IntoIterator<Item = SimStep>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Script made only of successful replies
    pub fn with_replies<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::with_script(replies.into_iter().map(|r| SimStep::Reply(r.into())))
    }

    pub fn calls(&self) -> Vec<SimCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl LlmProvider for SimProvider {
    fn name(&self) -> &str {
        "sim"
    }

    async fn chat(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<LlmResponse, LlmError> {
        let system_prompt = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone());
        let user_prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let call_number = {
            let mut calls = lock(&self.calls);
            calls.push(SimCall {
                system_prompt: system_prompt.clone(),
                user_prompt: user_prompt.clone(),
                params: params.clone(),
            });
            calls.len()
        };

        let step = lock(&self.script).pop_front();
        let text = match step {
            Some(SimStep::Reply(text)) => text,
            Some(SimStep::Fail(failure)) => return Err(failure.into_error()),
            None => format!("SIM_OUTPUT_{}", call_number),
        };

        let input_tokens = (system_prompt.as_deref().unwrap_or_default().split_whitespace().count()
            + user_prompt.split_whitespace().count()) as u32;
        let output_tokens = text.split_whitespace().count() as u32;

        Ok(LlmResponse {
            text,
            usage: Some(TokenUsage {
                input_tokens,
                output_tokens,
                total_tokens: input_tokens + output_tokens,
            }),
        })
    }
}
