//! Orchestration error taxonomy

use super::types::StageRole;
use crate::llm::LlmError;
use thiserror::Error;

/// Malformed request; the caller must fix it, retrying will not help
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error(
        "The generation request must include at least two agents (engineer and reviewer), got {found}"
    )]
    TooFewAgents { found: usize },

    #[error("No agent declares stage '{role}'")]
    MissingRole { role: StageRole },

    #[error("Stage '{role}' is declared by more than one agent: {}", .ids.join(", "))]
    DuplicateRole { role: StageRole, ids: Vec<String> },

    #[error("Agent id '{id}' appears more than once")]
    DuplicateAgentId { id: String },

    #[error("The pipeline has no stages")]
    NoStages,
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// Credential missing or unusable; needs operator intervention
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Transport or upstream failure while running a stage
    #[error("Stage '{stage}' failed (agent {agent_id}): {source}")]
    LlmCall {
        stage: String,
        agent_id: String,
        #[source]
        source: LlmError,
    },
}

impl OrchestrationError {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestrationError::Configuration(_) => "configuration",
            OrchestrationError::Validation(_) => "validation",
            OrchestrationError::LlmCall { .. } => "llm_call",
        }
    }

    /// Stage that failed, if the run got that far
    pub fn stage(&self) -> Option<&str> {
        match self {
            OrchestrationError::LlmCall { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

impl From<LlmError> for OrchestrationError {
    /// Errors raised while acquiring a provider, before any stage runs
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Configuration(msg) => OrchestrationError::Configuration(msg),
            other => OrchestrationError::Configuration(other.to_string()),
        }
    }
}
