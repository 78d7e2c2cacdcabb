//! Agents bound to an LLM provider for one pipeline run

use super::types::{Agent, StageRole};
use crate::llm::LlmProvider;
use std::fmt;
use std::sync::Arc;

/// A caller-supplied persona bound to the run's LLM provider
///
/// Immutable for the run. Holds no state beyond identity and persona.
pub struct BoundAgent {
    pub id: String,
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Opaque capability declarations
    pub tools: Vec<String>,
    /// Stage this agent was selected for, if any
    pub stage: Option<StageRole>,
    pub llm: Arc<dyn LlmProvider>,
}

impl BoundAgent {
    pub fn bind(agent: &Agent, stage: Option<StageRole>, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            role: agent.role.clone(),
            goal: agent.goal.clone(),
            backstory: agent.backstory.clone(),
            tools: agent.tools.clone(),
            stage,
            llm,
        }
    }

    /// Persona block for the system prompt
    pub fn persona(&self) -> String {
        let mut persona = format!("You are {}.", self.role.trim());
        if !self.goal.trim().is_empty() {
            persona.push_str(&format!("\nYour personal goal is: {}", self.goal.trim()));
        }
        if !self.backstory.trim().is_empty() {
            persona.push_str(&format!("\n{}", self.backstory.trim()));
        }
        persona
    }
}

impl fmt::Debug for BoundAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundAgent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("stage", &self.stage)
            .field("tools", &self.tools)
            .field("llm", &self.llm.name())
            .finish()
    }
}
