//! Request-side data model: agents, options and the generation request
//!
//! Field names follow the web client's camelCase JSON. Display-only agent
//! fields default when absent, since the client does not always send them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage an agent can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageRole {
    Engineer,
    Reviewer,
}

impl StageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageRole::Engineer => "engineer",
            StageRole::Reviewer => "reviewer",
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-facing display state. Never consulted by execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Ready,
    Working,
    Completed,
    Error,
    /// Any value the client sends that is not one of the above
    #[serde(other)]
    Unknown,
}

/// An agent persona as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Free text, used verbatim in prompts
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Capability identifiers; passed through, not interpreted
    #[serde(default)]
    pub tools: Vec<String>,
    /// Explicit stage binding; when no agent sets it, binding is positional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageRole>,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub avatar: String,
    // Display-only fields below are stored as sent and never validated
    #[serde(default)]
    pub expertise: i64,
    #[serde(default)]
    pub completed_tasks: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
}

/// Per-request generation options
///
/// Advisory unless `llm.honor_request_options` is enabled, in which case the
/// model parameters present here override the configured ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    pub include_tests: bool,
    pub include_documentation: bool,
    pub deployment_target: String,
}

/// One inbound generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub options: GenerationOptions,
}

impl GenerationRequest {
    /// False for an empty prompt and for one made only of whitespace
    pub fn has_prompt(&self) -> bool {
        !self.prompt.trim().is_empty()
    }
}
