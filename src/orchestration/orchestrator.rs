//! Entry point for one generation run
//!
//! Acquires a provider, builds the crew, then drives the pipeline. The
//! provider is created fresh for every run so credential changes take
//! effect without a restart, and nothing is shared between runs.

use super::builder;
use super::error::OrchestrationError;
use super::pipeline::{AgentPipeline, PipelineOutcome};
use super::task::StageDescriptor;
use super::types::{GenerationOptions, GenerationRequest};
use crate::config::LlmConfig;
use crate::llm::{self, CompletionParams, LlmError, LlmProvider};
use std::sync::Arc;
use tracing::Instrument;

/// Produces the provider for a single run
pub type ProviderFactory =
    Arc<dyn Fn() -> Result<Arc<dyn LlmProvider>, LlmError> + Send + Sync>;

#[derive(Clone)]
pub struct Orchestrator {
    factory: ProviderFactory,
    llm_config: LlmConfig,
    stages: Vec<StageDescriptor>,
}

impl Orchestrator {
    pub fn new(factory: ProviderFactory, llm_config: LlmConfig) -> Self {
        Self {
            factory,
            llm_config,
            stages: StageDescriptor::default_pipeline(),
        }
    }

    /// Orchestrator whose provider comes from `llm::create_provider`
    pub fn from_config(llm_config: &LlmConfig) -> Self {
        let config = llm_config.clone();
        let factory: ProviderFactory = Arc::new(move || llm::create_provider(&config));
        Self::new(factory, llm_config.clone())
    }

    /// Replace the default generate/review stage list
    pub fn with_stages(mut self, stages: Vec<StageDescriptor>) -> Self {
        self.stages = stages;
        self
    }

    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    /// Parameters for every call of a run
    ///
    /// Request options only apply when `honor_request_options` is set.
    pub fn completion_params(&self, options: &GenerationOptions) -> CompletionParams {
        let mut params = CompletionParams::from_config(&self.llm_config);
        if !self.llm_config.honor_request_options {
            return params;
        }
        if let Some(model) = options.model.as_ref().filter(|m| !m.trim().is_empty()) {
            params.model = model.clone();
        }
        if let Some(max_tokens) = options.max_tokens.filter(|n| *n > 0) {
            params.max_tokens = max_tokens;
        }
        if let Some(temperature) = options.temperature {
            params.temperature = temperature;
        }
        if let Some(top_p) = options.top_p {
            params.top_p = top_p;
        }
        params
    }

    pub async fn run(
        &self,
        request: &GenerationRequest,
    ) -> Result<PipelineOutcome, OrchestrationError> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("orchestrate", run_id = %run_id);
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(
        &self,
        request: &GenerationRequest,
    ) -> Result<PipelineOutcome, OrchestrationError> {
        tracing::info!(
            agents = request.agents.len(),
            template = request.template.as_deref().unwrap_or("-"),
            "Starting generation run"
        );
        tracing::debug!(options = ?request.options, "Request options");

        let llm = (self.factory)().map_err(|e| {
            tracing::error!("Could not create LLM provider: {}", e);
            OrchestrationError::from(e)
        })?;

        let crew = builder::build_with_stages(request, llm, &self.stages).map_err(|e| {
            tracing::warn!("Rejected generation request: {}", e);
            OrchestrationError::from(e)
        })?;

        let params = self.completion_params(&request.options);
        let mut pipeline = AgentPipeline::new(crew.tasks, params);
        let outcome = pipeline.execute().await?;

        tracing::info!(
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            total_tokens = outcome.total_usage().total_tokens,
            "Generation run finished"
        );
        Ok(outcome)
    }
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use super::*;
    use crate::llm::SimProvider;
    use crate::orchestration::error::ValidationError;
    use crate::orchestration::types::Agent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn agent(id: &str, role: &str) -> Agent {
        serde_json::from_value(serde_json::json!({
            "id": id, "role": role, "goal": "g", "backstory": "b"
        }))
        .unwrap()
    }

    fn request(agents: Vec<Agent>) -> GenerationRequest {
        GenerationRequest {
            prompt: "A todo app".to_string(),
            template: None,
            agents,
            options: GenerationOptions {
                model: Some("other-model".to_string()),
                max_tokens: Some(256),
                ..Default::default()
            },
        }
    }

    fn with_sim(sim: Arc<SimProvider>, config: LlmConfig) -> Orchestrator {
        let factory: ProviderFactory = Arc::new(move || {
            let llm: Arc<dyn LlmProvider> = sim.clone();
            Ok(llm)
        });
        Orchestrator::new(factory, config)
    }

    #[tokio::test]
    async fn options_are_advisory_by_default() {
        let sim = Arc::new(SimProvider::new());
        let orchestrator = with_sim(sim.clone(), LlmConfig::default());

        orchestrator
            .run(&request(vec![agent("a", "Engineer"), agent("b", "Reviewer")]))
            .await
            .unwrap();

        let defaults = LlmConfig::default();
        for call in sim.calls() {
            assert_eq!(call.params.model, defaults.model);
            assert_eq!(call.params.max_tokens, defaults.max_tokens);
        }
    }

    #[tokio::test]
    async fn options_override_when_honored() {
        let sim = Arc::new(SimProvider::new());
        let config = LlmConfig {
            honor_request_options: true,
            ..LlmConfig::default()
        };
        let orchestrator = with_sim(sim.clone(), config);

        orchestrator
            .run(&request(vec![agent("a", "Engineer"), agent("b", "Reviewer")]))
            .await
            .unwrap();

        let calls = sim.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.params.model == "other-model"));
        assert!(calls.iter().all(|c| c.params.max_tokens == 256));
    }

    #[tokio::test]
    async fn provider_failure_happens_before_validation() {
        let factory: ProviderFactory = Arc::new(|| {
            Err(LlmError::Configuration("API key not found".to_string()))
        });
        let orchestrator = Orchestrator::new(factory, LlmConfig::default());

        let err = orchestrator.run(&request(vec![])).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Configuration(_)));
    }

    #[tokio::test]
    async fn invalid_request_makes_no_calls() {
        let sim = Arc::new(SimProvider::new());
        let orchestrator = with_sim(sim.clone(), LlmConfig::default());

        let err = orchestrator
            .run(&request(vec![agent("a", "Engineer")]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestrationError::Validation(ValidationError::TooFewAgents { found: 1 })
        ));
        assert_eq!(sim.call_count(), 0);
    }

    #[tokio::test]
    async fn provider_is_created_per_run() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let factory: ProviderFactory = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let llm: Arc<dyn LlmProvider> = Arc::new(SimProvider::new());
            Ok(llm)
        });
        let orchestrator = Orchestrator::new(factory, LlmConfig::default());
        let req = request(vec![agent("a", "Engineer"), agent("b", "Reviewer")]);

        let first = orchestrator.run(&req).await.unwrap();
        let second = orchestrator.run(&req).await.unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 2);
        // Fresh provider each time, so the call counter restarts
        assert_eq!(first.output, "SIM_OUTPUT_2");
        assert_eq!(second.output, "SIM_OUTPUT_2");
    }
}
