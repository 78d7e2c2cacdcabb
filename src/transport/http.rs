//! HTTP gateway: `POST /v1/orchestrate` and `GET /health`

use super::types::{
    ErrorBody, GenerationResponse, HealthResponse, EMPTY_PROMPT_DETAIL, GENERIC_FAILURE_DETAIL,
    UNAUTHORIZED_DETAIL,
};
use crate::config::Config;
use crate::orchestration::{GenerationRequest, Orchestrator};
use anyhow::{Context, Result};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Header carrying the gateway key when `server.api_key` is set
pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    orchestrator: Orchestrator,
    server_api_key: Option<String>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, server_api_key: Option<String>) -> Self {
        Self {
            orchestrator,
            server_api_key: server_api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Router with the gateway routes and CORS applied
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let state = Arc::new(state);

    let api = Router::new()
        .route("/v1/orchestrate", post(orchestrate))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Router for a loaded configuration
pub fn build_router(config: &Config) -> Router {
    let state = AppState::new(
        Orchestrator::from_config(&config.llm),
        config.server.api_key.clone(),
    );
    router(state, &config.server.cors_origins)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Run HTTP server
pub async fn run_http_server(config: Config) -> Result<()> {
    if !config.llm.has_usable_api_key() && config.llm.provider != "sim" {
        // Requests will fail until a key is configured; the server still starts
        tracing::warn!(
            "No usable {} API key configured; generation requests will fail",
            config.llm.provider
        );
    }

    let app = build_router(&config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn require_api_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.server_api_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if provided != Some(expected) {
        tracing::warn!("Rejected request with missing or invalid API key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new(UNAUTHORIZED_DETAIL)),
        )
            .into_response();
    }

    next.run(request).await
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn orchestrate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> Response {
    if !request.has_prompt() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(EMPTY_PROMPT_DETAIL)),
        )
            .into_response();
    }

    // Detached so a client disconnect cannot cancel a run midway
    let orchestrator = state.orchestrator.clone();
    let handle = tokio::spawn(async move { orchestrator.run(&request).await });

    match handle.await {
        Ok(Ok(outcome)) => (
            StatusCode::OK,
            Json(GenerationResponse::from_outcome(&outcome)),
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!(
                kind = e.kind(),
                stage = e.stage().unwrap_or("-"),
                "Orchestration failed: {}",
                e
            );
            generic_failure()
        }
        Err(e) => {
            tracing::error!("Orchestration task aborted: {}", e);
            generic_failure()
        }
    }
}

fn generic_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(GENERIC_FAILURE_DETAIL)),
    )
        .into_response()
}
