//! Generic OpenAI-compatible chat-completions client
//!
//! Any endpoint that accepts the `/chat/completions` request shape works here
//! (Cerebras, OpenAI, local gateways). One call is one HTTP request: no
//! streaming, no conversation state kept between calls.
//!
//! SECURITY: Credentials are only sent to the configured endpoint.

use super::{CompletionParams, LlmError, LlmProvider, LlmResponse, Message, TokenUsage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Configuration Types
// ============================================================================

/// Authentication method for the API
#[derive(Clone)]
pub enum AuthMethod {
    /// Bearer token in Authorization header
    BearerToken(String),
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::BearerToken(_) => f.write_str("BearerToken(****)"),
        }
    }
}

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    /// Provider name used in logs and errors
    pub name: String,
    /// Full URL of the chat completions endpoint
    pub base_url: String,
    pub auth: AuthMethod,
    /// Transport timeout for one request
    pub timeout: Duration,
}

impl OpenAiCompatConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth,
            timeout: Duration::from_secs(300),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic OpenAI-compatible provider
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatProvider {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn build_request(&self, messages: &[Message], params: &CompletionParams) -> OpenAiRequest {
        OpenAiRequest {
            model: params.model.clone(),
            messages: messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: m.role.as_str(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stream: false,
        }
    }

    /// Build request with authorization headers
    fn build_http_request(&self, body: &OpenAiRequest) -> reqwest::RequestBuilder {
        let req = self
            .client
            .post(&self.config.base_url)
            .header("Content-Type", "application/json");

        let req = match &self.config.auth {
            AuthMethod::BearerToken(token) => {
                req.header("Authorization", format!("Bearer {}", token))
            }
        };

        req.json(body)
    }

    /// Take the first choice's text; anything else is a malformed response
    fn parse_response(&self, response: OpenAiResponse) -> Result<LlmResponse, LlmError> {
        let usage = response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let text = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                LlmError::MalformedResponse(format!("{} returned no choices", self.config.name))
            })?
            .message
            .content
            .ok_or_else(|| {
                LlmError::MalformedResponse(format!(
                    "{} returned a choice without content",
                    self.config.name
                ))
            })?;

        Ok(LlmResponse { text, usage })
    }

    async fn chat_impl(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<LlmResponse, LlmError> {
        tracing::debug!(
            target: "llm",
            provider = self.config.name.as_str(),
            model = params.model.as_str(),
            messages = messages.len(),
            max_tokens = params.max_tokens,
            "Sending chat request"
        );

        let request = self.build_request(messages, params);
        let response = self
            .build_http_request(&request)
            .send()
            .await
            .map_err(LlmError::from_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_http_status(status, error_text));
        }

        let body = response.text().await.map_err(LlmError::from_network_error)?;
        let api_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::MalformedResponse(format!(
                "Failed to parse {} API response: {}",
                self.config.name, e
            ))
        })?;

        let parsed = self.parse_response(api_response)?;
        tracing::debug!(
            target: "llm",
            provider = self.config.name.as_str(),
            chars = parsed.text.len(),
            total_tokens = parsed.usage.map(|u| u.total_tokens).unwrap_or(0),
            "Chat request completed"
        );
        Ok(parsed)
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn chat(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<LlmResponse, LlmError> {
        self.chat_impl(messages, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(OpenAiCompatConfig::new(
            "test",
            "http://127.0.0.1:9/v1/chat/completions",
            AuthMethod::BearerToken("sk-test".to_string()),
        ))
        .unwrap()
    }

    fn params() -> CompletionParams {
        CompletionParams {
            model: "llama-4-maverick-17b-128e-instruct".to_string(),
            max_tokens: 1024,
            temperature: 0.6,
            top_p: 0.9,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let p = provider();
        let body = p.build_request(
            &[Message::system("sys"), Message::user("hello")],
            &params(),
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "llama-4-maverick-17b-128e-instruct");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["stream"], false);
        assert!((json["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_parse_first_choice() {
        let p = provider();
        let response: OpenAiResponse = serde_json::from_value(serde_json::json!({
            "model": "llama-4-maverick-17b-128e-instruct",
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 7, "completion_tokens": 3, "total_tokens": 10}
        }))
        .unwrap();

        let parsed = p.parse_response(response).unwrap();
        assert_eq!(parsed.text, "first");
        assert_eq!(parsed.usage.unwrap().total_tokens, 10);
    }

    #[test]
    fn test_parse_without_choices_is_malformed() {
        let p = provider();
        let response: OpenAiResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        let err = p.parse_response(response).unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn test_auth_debug_is_redacted() {
        let auth = AuthMethod::BearerToken("sk-very-secret".to_string());
        assert!(!format!("{:?}", auth).contains("very-secret"));
    }
}
