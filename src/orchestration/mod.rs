//! Agent Orchestration - generate, then review
//!
//! A request's agents are bound to pipeline stages, each stage becomes a
//! task, and the tasks run strictly in sequence against one LLM provider.

pub mod agent;
pub mod builder;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod task;
pub mod types;

pub use agent::BoundAgent;
pub use builder::{Crew, MIN_AGENTS};
pub use error::{OrchestrationError, ValidationError};
pub use orchestrator::{Orchestrator, ProviderFactory};
pub use pipeline::{AgentPipeline, PipelineOutcome, PipelineState, StageReport};
pub use task::{StageDescriptor, Task};
pub use types::{Agent, AgentStatus, GenerationOptions, GenerationRequest, StageRole};
