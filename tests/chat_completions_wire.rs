//! Chat-completions wire contract, checked against a local mock server

use appforge::config::{LlmConfig, RetryConfig};
use appforge::llm::{
    self, AuthMethod, CompletionParams, LlmError, LlmProvider, OpenAiCompatConfig,
    OpenAiCompatProvider, RetryingProvider,
};
use appforge::orchestration::{GenerationRequest, Orchestrator};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "model": "llama-4-maverick-17b-128e-instruct",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

fn provider(server: &MockServer) -> OpenAiCompatProvider {
    OpenAiCompatProvider::new(
        OpenAiCompatConfig::new(
            "cerebras",
            format!("{}/v1/chat/completions", server.uri()),
            AuthMethod::BearerToken("csk-test".to_string()),
        )
        .with_timeout(Duration::from_secs(5)),
    )
    .unwrap()
}

fn params() -> CompletionParams {
    CompletionParams::from_config(&LlmConfig::default())
}

#[tokio::test]
async fn sends_bearer_token_and_fixed_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer csk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama-4-maverick-17b-128e-instruct",
            "max_tokens": 32768,
            "top_p": 0.9,
            "stream": false,
            "messages": [
                {"role": "system", "content": "be an engineer"},
                {"role": "user", "content": "build a todo app"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("CODE_V1")))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .complete("be an engineer", "build a todo app", &params())
        .await
        .unwrap();

    assert_eq!(response.text, "CODE_V1");
    assert_eq!(response.usage.unwrap().total_tokens, 15);
}

#[tokio::test]
async fn status_codes_map_to_typed_errors() {
    let cases = [
        (401, "unauthorized"),
        (429, "rate_limited"),
        (400, "bad_request"),
        (503, "service_error"),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream says no"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete("s", "u", &params())
            .await
            .unwrap_err();

        let kind = match err {
            LlmError::Unauthorized(_) => "unauthorized",
            LlmError::RateLimited(_) => "rate_limited",
            LlmError::BadRequest(_) => "bad_request",
            LlmError::ServiceError(_) => "service_error",
            other => panic!("unexpected error for {}: {:?}", status, other),
        };
        assert_eq!(kind, expected, "status {}", status);
    }
}

#[tokio::test]
async fn empty_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let err = provider(&server)
        .complete("s", "u", &params())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::MalformedResponse(_)));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .complete("s", "u", &params())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::MalformedResponse(_)));
}

#[tokio::test]
async fn retry_recovers_from_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("CODE_V1")))
        .mount(&server)
        .await;

    let retrying = RetryingProvider::new(
        Arc::new(provider(&server)),
        RetryConfig {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        },
    );

    let response = retrying.complete("s", "u", &params()).await.unwrap();
    assert_eq!(response.text, "CODE_V1");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let retrying = RetryingProvider::new(
        Arc::new(provider(&server)),
        RetryConfig {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        },
    );

    let err = retrying.complete("s", "u", &params()).await.unwrap_err();
    assert!(matches!(err, LlmError::Unauthorized(_)));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn full_run_against_cerebras_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("Generate a complete application"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("CODE_V1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("Review the generated code"))
        .and(body_string_contains("CODE_V1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("CODE_V2")))
        .expect(1)
        .mount(&server)
        .await;

    let config = LlmConfig {
        api_key: "csk-test".to_string(),
        base_url: format!("{}/v1/chat/completions", server.uri()),
        ..LlmConfig::default()
    };
    assert_eq!(llm::create_provider(&config).unwrap().name(), "cerebras");

    let request: GenerationRequest = serde_json::from_value(serde_json::json!({
        "prompt": "A todo app",
        "agents": [
            {"id": "eng", "role": "Engineer", "goal": "g", "backstory": "b"},
            {"id": "rev", "role": "Reviewer", "goal": "g", "backstory": "b"}
        ]
    }))
    .unwrap();

    let outcome = Orchestrator::from_config(&config).run(&request).await.unwrap();

    assert_eq!(outcome.output, "CODE_V2");
    assert_eq!(outcome.total_usage().total_tokens, 30);
}
