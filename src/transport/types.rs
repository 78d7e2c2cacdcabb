//! Wire types for the HTTP gateway and the `orchestrate` command

use crate::orchestration::PipelineOutcome;
use serde::{Deserialize, Serialize};

/// Body returned for every orchestration failure, whatever the cause
pub const GENERIC_FAILURE_DETAIL: &str = "An unexpected error occurred during app generation.";
pub const EMPTY_PROMPT_DETAIL: &str = "Prompt cannot be empty.";
pub const UNAUTHORIZED_DETAIL: &str = "Invalid or missing API key.";

// Not generated yet; fixed values the web client renders as-is
const PLACEHOLDER_PREVIEW: &str = "<p>Preview will be generated here.</p>";
const PLACEHOLDER_COMPLEXITY: &str = "medium";
const PLACEHOLDER_FRAMEWORKS: &[&str] = &["React"];
const PLACEHOLDER_FEATURES: &[&str] = &["Login", "Dashboard"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    /// Wall-clock run time in milliseconds
    pub generation_time: u64,
    /// Total tokens reported by the LLM across all stages
    pub token_usage: u64,
    pub complexity: String,
    pub frameworks: Vec<String>,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    pub code: String,
    pub preview: String,
    pub metadata: GenerationMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Not deployed yet; always absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
}

impl GenerationResponse {
    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        Self {
            success: true,
            code: outcome.output.clone(),
            preview: PLACEHOLDER_PREVIEW.to_string(),
            metadata: GenerationMetadata {
                generation_time: outcome.elapsed.as_millis() as u64,
                token_usage: u64::from(outcome.total_usage().total_tokens),
                complexity: PLACEHOLDER_COMPLEXITY.to_string(),
                frameworks: PLACEHOLDER_FRAMEWORKS.iter().map(|s| s.to_string()).collect(),
                features: PLACEHOLDER_FEATURES.iter().map(|s| s.to_string()).collect(),
            },
            error: None,
            deployment_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_hash: Option<String>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: option_env!("APPFORGE_GIT_HASH")
                .filter(|h| !h.is_empty() && *h != "unknown")
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::TokenUsage;
    use crate::orchestration::StageReport;
    use std::time::Duration;

    fn report(stage: &str, total: Option<u32>) -> StageReport {
        StageReport {
            stage: stage.to_string(),
            agent_id: format!("{}-agent", stage),
            duration: Duration::from_millis(10),
            usage: total.map(|t| TokenUsage {
                input_tokens: 0,
                output_tokens: t,
                total_tokens: t,
            }),
        }
    }

    #[test]
    fn response_uses_camel_case_and_measured_values() {
        let outcome = PipelineOutcome {
            output: "CODE_V2".to_string(),
            stages: vec![report("generate", Some(120)), report("review", None)],
            elapsed: Duration::from_millis(1500),
        };

        let json = serde_json::to_value(GenerationResponse::from_outcome(&outcome)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["code"], "CODE_V2");
        assert!(json.get("error").is_none());
        assert!(json.get("deploymentUrl").is_none());
        assert_eq!(json["preview"], PLACEHOLDER_PREVIEW);
        assert_eq!(json["metadata"]["generationTime"], 1500);
        assert_eq!(json["metadata"]["tokenUsage"], 120);
        assert_eq!(json["metadata"]["complexity"], "medium");
        assert_eq!(json["metadata"]["frameworks"], serde_json::json!(["React"]));
        assert_eq!(
            json["metadata"]["features"],
            serde_json::json!(["Login", "Dashboard"])
        );
    }

    #[test]
    fn health_reports_ok() {
        let health = HealthResponse::ok();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
