//! Transport layer for the HTTP gateway and CLI commands

pub mod cli;
pub mod http;
pub mod types;

pub use http::{build_router, router, run_http_server, AppState};
pub use types::{ErrorBody, GenerationMetadata, GenerationResponse, HealthResponse};
