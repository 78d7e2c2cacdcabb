//! Agent Pipeline - Sequential agent chaining
//!
//! Runs tasks strictly in order. Each task's output becomes the context of
//! the next dependent task, and the last task's output is the result. Any
//! stage failure stops the run; later stages never execute.

use super::error::OrchestrationError;
use super::task::Task;
use crate::llm::{CompletionParams, TokenUsage};
use std::fmt;
use std::time::{Duration, Instant};

/// Where a run currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Running { stage: String },
    Done,
    /// Absorbing: no transition leaves this state
    Failed { stage: String },
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Start => f.write_str("START"),
            PipelineState::Running { stage } => write!(f, "{}", stage.to_uppercase()),
            PipelineState::Done => f.write_str("DONE"),
            PipelineState::Failed { stage } => write!(f, "FAILED({})", stage),
        }
    }
}

/// Timing and usage for one completed stage
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: String,
    pub agent_id: String,
    pub duration: Duration,
    pub usage: Option<TokenUsage>,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Output of the final stage
    pub output: String,
    pub stages: Vec<StageReport>,
    pub elapsed: Duration,
}

impl PipelineOutcome {
    /// Token usage summed over stages that reported it
    pub fn total_usage(&self) -> TokenUsage {
        let mut total = TokenUsage::default();
        for usage in self.stages.iter().filter_map(|s| s.usage.as_ref()) {
            total.accumulate(usage);
        }
        total
    }
}

pub struct AgentPipeline {
    tasks: Vec<Task>,
    params: CompletionParams,
    state: PipelineState,
}

impl AgentPipeline {
    pub fn new(tasks: Vec<Task>, params: CompletionParams) -> Self {
        Self {
            tasks,
            params,
            state: PipelineState::Start,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    fn transition(&mut self, next: PipelineState) {
        if matches!(self.state, PipelineState::Failed { .. }) {
            return;
        }
        tracing::debug!("Pipeline {} -> {}", self.state, next);
        self.state = next;
    }

    pub async fn execute(&mut self) -> Result<PipelineOutcome, OrchestrationError> {
        let started = Instant::now();
        let mut reports = Vec::with_capacity(self.tasks.len());
        let mut context: Option<String> = None;

        for idx in 0..self.tasks.len() {
            let stage = self.tasks[idx].stage.clone();
            self.transition(PipelineState::Running {
                stage: stage.clone(),
            });

            let task = &self.tasks[idx];
            let agent_id = task.agent.id.clone();
            let system_prompt = task.system_prompt();
            let user_prompt = task.user_prompt(context.as_deref());

            let stage_started = Instant::now();
            let result = task
                .agent
                .llm
                .complete(&system_prompt, &user_prompt, &self.params)
                .await;
            let duration = stage_started.elapsed();

            match result {
                Ok(response) => {
                    tracing::info!(
                        stage = stage.as_str(),
                        agent = agent_id.as_str(),
                        duration_ms = duration.as_millis() as u64,
                        total_tokens = response.usage.map(|u| u.total_tokens).unwrap_or(0),
                        "Stage '{}' completed",
                        stage
                    );
                    reports.push(StageReport {
                        stage,
                        agent_id,
                        duration,
                        usage: response.usage,
                    });
                    context = Some(response.text);
                }
                Err(source) => {
                    tracing::error!(
                        stage = stage.as_str(),
                        agent = agent_id.as_str(),
                        duration_ms = duration.as_millis() as u64,
                        "Stage '{}' failed: {}",
                        stage,
                        source
                    );
                    self.transition(PipelineState::Failed {
                        stage: stage.clone(),
                    });
                    return Err(OrchestrationError::LlmCall {
                        stage,
                        agent_id,
                        source,
                    });
                }
            }
        }

        self.transition(PipelineState::Done);
        Ok(PipelineOutcome {
            output: context.unwrap_or_default(),
            stages: reports,
            elapsed: started.elapsed(),
        })
    }
}
