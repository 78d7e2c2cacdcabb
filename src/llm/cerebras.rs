//! Cerebras LLM provider
//!
//! Cerebras Cloud exposes an OpenAI-compatible chat-completions API, so this
//! is a thin credential gate in front of the common layer.
//!
//! SECURITY: The API key is ONLY sent to the configured Cerebras endpoint.

use super::{
    openai_compat::{AuthMethod, OpenAiCompatConfig, OpenAiCompatProvider},
    CompletionParams, LlmError, LlmProvider, LlmResponse, Message,
};
use crate::config::{LlmConfig, API_KEY_ENV};
use async_trait::async_trait;
use std::time::Duration;

/// Cerebras provider using the common OpenAI-compatible layer
pub struct CerebrasProvider {
    inner: OpenAiCompatProvider,
}

impl CerebrasProvider {
    /// Build a provider from settings
    ///
    /// Fails with `LlmError::Configuration` when the key is empty or still the
    /// placeholder. No request is made in that case.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = require_api_key(config, "Cerebras")?;

        let inner = OpenAiCompatProvider::new(
            OpenAiCompatConfig::new(
                "cerebras",
                config.base_url.clone(),
                AuthMethod::BearerToken(api_key),
            )
            .with_timeout(Duration::from_secs(config.timeout_secs)),
        )?;

        Ok(Self { inner })
    }
}

/// Return the configured key, or a configuration error naming `provider`
pub(crate) fn require_api_key(config: &LlmConfig, provider: &str) -> Result<String, LlmError> {
    if !config.has_usable_api_key() {
        return Err(LlmError::Configuration(format!(
            "{} API key not found. Set {} or llm.api_key in the config file.",
            provider, API_KEY_ENV
        )));
    }
    Ok(config.api_key.trim().to_string())
}

#[async_trait]
impl LlmProvider for CerebrasProvider {
    fn name(&self) -> &str {
        "cerebras"
    }

    async fn chat(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<LlmResponse, LlmError> {
        self.inner.chat(messages, params).await
    }
}
