//! LLM provider implementations

use crate::config::LlmConfig;
use std::sync::Arc;
use std::time::Duration;

mod cerebras;
mod error;
mod openai_compat;
mod retry;
mod types;

// Simulation provider (feature-gated)
#[cfg(feature = "sim")]
mod sim;
#[cfg(feature = "sim")]
pub use sim::{SimCall, SimFailure, SimProvider, SimStep};

pub use cerebras::CerebrasProvider;
pub use error::LlmError;
pub use openai_compat::{AuthMethod, OpenAiCompatConfig, OpenAiCompatProvider};
pub use retry::RetryingProvider;
pub use types::*;

use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations are stateless between calls: each `chat` is one
/// independent request with no memory of earlier ones.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Send a chat completion request and return the first choice
    async fn chat(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<LlmResponse, LlmError>;

    /// Send exactly one system message and one user message
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &CompletionParams,
    ) -> Result<LlmResponse, LlmError> {
        let messages = [Message::system(system_prompt), Message::user(user_prompt)];
        self.chat(&messages, params).await
    }
}

/// Create an LLM provider from settings
///
/// Credential checks happen here, so a missing key surfaces as
/// `LlmError::Configuration` before anything is sent.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider: Arc<dyn LlmProvider> = match config.provider.to_lowercase().as_str() {
        "cerebras" => Arc::new(CerebrasProvider::new(config)?),
        "openai-compatible" | "openai_compat" | "openai" => {
            let api_key = cerebras::require_api_key(config, "OpenAI-compatible")?;
            Arc::new(OpenAiCompatProvider::new(
                OpenAiCompatConfig::new(
                    "openai-compatible",
                    config.base_url.clone(),
                    AuthMethod::BearerToken(api_key),
                )
                .with_timeout(Duration::from_secs(config.timeout_secs)),
            )?)
        }
        #[cfg(feature = "sim")]
        "sim" | "test" => Arc::new(SimProvider::new()),
        other => {
            return Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported: cerebras, openai-compatible",
                other
            )))
        }
    };

    if config.retry.max_attempts > 1 {
        tracing::debug!(
            provider = provider.name(),
            max_attempts = config.retry.max_attempts,
            "Wrapping provider with retry policy"
        );
        Ok(Arc::new(RetryingProvider::new(
            provider,
            config.retry.clone(),
        )))
    } else {
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_configuration_error() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            api_key: "csk-123".to_string(),
            ..LlmConfig::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn default_config_fails_on_placeholder_key() {
        let err = create_provider(&LlmConfig::default()).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn openai_compatible_also_requires_key() {
        let config = LlmConfig {
            provider: "openai-compatible".to_string(),
            api_key: String::new(),
            ..LlmConfig::default()
        };
        assert!(create_provider(&config).err().unwrap().is_configuration());
    }

    #[test]
    fn retry_policy_keeps_provider_name() {
        let mut config = LlmConfig {
            api_key: "csk-123".to_string(),
            ..LlmConfig::default()
        };
        config.retry.max_attempts = 3;
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "cerebras");
    }

    #[cfg(feature = "sim")]
    #[test]
    fn sim_provider_needs_no_key() {
        let config = LlmConfig {
            provider: "sim".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(create_provider(&config).unwrap().name(), "sim");
    }
}
