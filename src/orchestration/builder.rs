//! Turns a generation request into bound agents and an ordered task list

use super::agent::BoundAgent;
use super::error::ValidationError;
use super::task::{StageDescriptor, Task};
use super::types::{GenerationRequest, StageRole};
use crate::llm::LlmProvider;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Minimum agents per request: one engineer, one reviewer
pub const MIN_AGENTS: usize = 2;

/// Agents and tasks for one run
#[derive(Debug)]
pub struct Crew {
    pub agents: Vec<Arc<BoundAgent>>,
    pub tasks: Vec<Task>,
}

/// Build the default generate/review crew
pub fn build(
    request: &GenerationRequest,
    llm: Arc<dyn LlmProvider>,
) -> Result<Crew, ValidationError> {
    build_with_stages(request, llm, &StageDescriptor::default_pipeline())
}

/// Build a crew for an arbitrary ordered list of stages
pub fn build_with_stages(
    request: &GenerationRequest,
    llm: Arc<dyn LlmProvider>,
    stages: &[StageDescriptor],
) -> Result<Crew, ValidationError> {
    if !request.has_prompt() {
        return Err(ValidationError::EmptyPrompt);
    }
    if stages.is_empty() {
        return Err(ValidationError::NoStages);
    }
    if request.agents.len() < MIN_AGENTS {
        return Err(ValidationError::TooFewAgents {
            found: request.agents.len(),
        });
    }

    let mut seen = HashSet::new();
    for agent in &request.agents {
        if !seen.insert(agent.id.as_str()) {
            return Err(ValidationError::DuplicateAgentId {
                id: agent.id.clone(),
            });
        }
    }

    let mut required = Vec::new();
    for stage in stages {
        if !required.contains(&stage.role) {
            required.push(stage.role);
        }
    }
    let assignment = resolve_roles(request, &required)?;

    let agents: Vec<Arc<BoundAgent>> = request
        .agents
        .iter()
        .enumerate()
        .map(|(idx, agent)| {
            let stage = assignment
                .iter()
                .find(|(_, i)| **i == idx)
                .map(|(role, _)| *role);
            Arc::new(BoundAgent::bind(agent, stage, llm.clone()))
        })
        .collect();

    let tasks = stages
        .iter()
        .map(|descriptor| {
            let idx = assignment[&descriptor.role];
            Task::from_descriptor(descriptor, &request.prompt, agents[idx].clone())
        })
        .collect();

    Ok(Crew { agents, tasks })
}

/// Map each required role to an agent index
///
/// Tagged agents are matched by `stage`. When no agent carries a tag the
/// request falls back to position: the n-th required role takes agent n.
fn resolve_roles(
    request: &GenerationRequest,
    required: &[StageRole],
) -> Result<HashMap<StageRole, usize>, ValidationError> {
    let tagged = request.agents.iter().any(|a| a.stage.is_some());
    let mut assignment = HashMap::new();

    if tagged {
        for role in required {
            let matches: Vec<usize> = request
                .agents
                .iter()
                .enumerate()
                .filter(|(_, a)| a.stage == Some(*role))
                .map(|(i, _)| i)
                .collect();
            match matches.as_slice() {
                [] => return Err(ValidationError::MissingRole { role: *role }),
                [idx] => {
                    assignment.insert(*role, *idx);
                }
                many => {
                    return Err(ValidationError::DuplicateRole {
                        role: *role,
                        ids: many
                            .iter()
                            .map(|&i| request.agents[i].id.clone())
                            .collect(),
                    })
                }
            }
        }
    } else {
        if request.agents.len() < required.len() {
            return Err(ValidationError::TooFewAgents {
                found: request.agents.len(),
            });
        }
        tracing::warn!(
            "No agent declares a stage; binding {} by position",
            required
                .iter()
                .enumerate()
                .map(|(i, role)| format!("agents[{}]={}", i, role))
                .collect::<Vec<_>>()
                .join(", ")
        );
        for (idx, role) in required.iter().enumerate() {
            assignment.insert(*role, idx);
        }
    }

    Ok(assignment)
}
