//! Stage descriptors and the tasks built from them

use super::agent::BoundAgent;
use super::types::StageRole;
use std::sync::Arc;

const GENERATION_SYSTEM_PREAMBLE: &str = "You are an expert software engineer.";

const GENERATION_TEMPLATE: &str = "Generate a complete application based on the following description: '{prompt}'. \
The application should be well-structured, with separate frontend and backend code if necessary. \
The output should be a single block of code that can be copied and pasted into files.";

const GENERATION_EXPECTED: &str =
    "The complete code for the application, with clear file names and code blocks.";

const REVIEW_TEMPLATE: &str = "Review the generated code. Check for bugs, security vulnerabilities, and performance issues. \
Suggest improvements to the code structure, readability, and documentation. \
If the code is good, approve it and return the original code. \
If not, provide detailed feedback and return the improved code.";

const REVIEW_EXPECTED: &str = "The final, reviewed, and approved code for the application.";

/// Shape of one pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageDescriptor {
    pub name: String,
    pub role: StageRole,
    /// Fixed text placed ahead of the agent persona in the system prompt
    pub system_preamble: Option<String>,
    /// Task description; `{prompt}` is replaced with the request prompt
    pub prompt_template: String,
    pub expected_output: String,
    /// Feed the previous stage's output in as context
    pub depends_on_previous: bool,
}

impl StageDescriptor {
    pub fn generation() -> Self {
        Self {
            name: "generate".to_string(),
            role: StageRole::Engineer,
            system_preamble: Some(GENERATION_SYSTEM_PREAMBLE.to_string()),
            prompt_template: GENERATION_TEMPLATE.to_string(),
            expected_output: GENERATION_EXPECTED.to_string(),
            depends_on_previous: false,
        }
    }

    pub fn review() -> Self {
        Self {
            name: "review".to_string(),
            role: StageRole::Reviewer,
            system_preamble: None,
            prompt_template: REVIEW_TEMPLATE.to_string(),
            expected_output: REVIEW_EXPECTED.to_string(),
            depends_on_previous: true,
        }
    }

    /// Generation followed by review
    pub fn default_pipeline() -> Vec<Self> {
        vec![Self::generation(), Self::review()]
    }
}

/// One unit of pipeline work, assigned to exactly one agent
#[derive(Debug)]
pub struct Task {
    pub stage: String,
    pub description: String,
    /// Acceptance criterion shown to the model; not checked mechanically
    pub expected_output: String,
    pub agent: Arc<BoundAgent>,
    system_preamble: Option<String>,
    depends_on_previous: bool,
}

impl Task {
    pub fn from_descriptor(
        descriptor: &StageDescriptor,
        prompt: &str,
        agent: Arc<BoundAgent>,
    ) -> Self {
        Self {
            stage: descriptor.name.clone(),
            // Single pass over the fixed template; the prompt text is not rescanned
            description: descriptor.prompt_template.replace("{prompt}", prompt),
            expected_output: descriptor.expected_output.clone(),
            agent,
            system_preamble: descriptor.system_preamble.clone(),
            depends_on_previous: descriptor.depends_on_previous,
        }
    }

    pub fn depends_on_previous(&self) -> bool {
        self.depends_on_previous
    }

    pub fn system_prompt(&self) -> String {
        match &self.system_preamble {
            Some(preamble) => format!("{}\n\n{}", preamble, self.agent.persona()),
            None => self.agent.persona(),
        }
    }

    /// User prompt for this task, with the upstream output as context
    pub fn user_prompt(&self, context: Option<&str>) -> String {
        let mut prompt = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}",
            self.description, self.expected_output
        );
        if let Some(context) = context.filter(|_| self.depends_on_previous) {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(context);
        }
        prompt
    }
}
