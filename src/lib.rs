//! appforge: turn an application description into reviewed code
//!
//! This library provides:
//! - A two-stage agent pipeline: an engineer agent generates code, a reviewer agent reviews it
//! - A chat-completions client for Cerebras and other OpenAI-compatible APIs
//! - An HTTP gateway (`POST /v1/orchestrate`, `GET /health`)

pub mod config;
pub mod llm;
pub mod orchestration;
pub mod transport;

pub use config::Config;
pub use orchestration::{GenerationRequest, Orchestrator, PipelineOutcome};
pub use transport::GenerationResponse;
