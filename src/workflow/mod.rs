//! AI-suggested workflows for key results
//!
//! [`WorkflowGenerator`] asks the configured [`Provider`] for 3 to 5 actionable
//! steps toward a key result and validates the structured answer. Every
//! failure collapses into a [`WorkflowError`] whose message is safe to show to
//! the user; the technical cause is kept in [`WorkflowError::detail`].

use crate::config::GeminiConfig;
use crate::okr::WorkflowStep;
use crate::provider::{CompletionRequest, Provider};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;

/// Fewest steps a generated workflow may contain
pub const MIN_STEPS: usize = 3;

/// Most steps a generated workflow may contain
pub const MAX_STEPS: usize = 5;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Failure of a workflow generation request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Objective or key result not found.")]
    NotFound,

    #[error(
        "Could not generate the workflow. The AI may be overloaded or the request was invalid. Please try again later."
    )]
    Generation { detail: String },
}

impl WorkflowError {
    fn generation(detail: impl Into<String>) -> Self {
        Self::Generation {
            detail: detail.into(),
        }
    }

    /// Technical cause, for logs
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::NotFound => None,
            Self::Generation { detail } => Some(detail),
        }
    }
}

/// Shape the model is asked to return for each step
#[derive(Debug, Deserialize)]
struct RawWorkflowStep {
    title: String,
    description: String,
    #[allow(dead_code)]
    status: String,
}

/// Generates workflow suggestions through a text-generation provider
#[derive(Clone)]
pub struct WorkflowGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    thinking_budget: Option<u32>,
}

impl std::fmt::Debug for WorkflowGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowGenerator")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("thinking_budget", &self.thinking_budget)
            .finish()
    }
}

impl WorkflowGenerator {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            model: DEFAULT_MODEL.to_string(),
            thinking_budget: Some(0),
        }
    }

    /// Use the model and thinking budget from the `[gemini]` config section
    pub fn from_config(provider: Arc<dyn Provider>, config: &GeminiConfig) -> Self {
        Self {
            provider,
            model: config.model().to_string(),
            thinking_budget: config.thinking_budget(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the provider for a workflow. Returned steps are all `Todo` with fresh ids.
    pub async fn generate(
        &self,
        objective_title: &str,
        key_result_title: &str,
    ) -> Result<Vec<WorkflowStep>, WorkflowError> {
        let request = CompletionRequest::new(
            self.model.clone(),
            build_prompt(objective_title, key_result_title),
        )
        .with_json_schema(response_schema())
        .with_thinking_budget(self.thinking_budget);

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    provider = self.provider.name(),
                    model = %self.model,
                    error = %format!("{err:#}"),
                    "Workflow generation request failed"
                );
                return Err(WorkflowError::generation(format!("{err:#}")));
            }
        };

        match parse_steps(&response.text) {
            Ok(steps) => {
                tracing::info!(
                    model = %self.model,
                    steps = steps.len(),
                    total_tokens = response.usage.total_tokens,
                    "Workflow generated"
                );
                Ok(steps)
            }
            Err(err) => {
                tracing::warn!(
                    model = %self.model,
                    error = err.detail().unwrap_or_default(),
                    "Workflow response did not match the expected shape"
                );
                Err(err)
            }
        }
    }
}

/// Instruction sent to the model
pub fn build_prompt(objective_title: &str, key_result_title: &str) -> String {
    format!(
        "You are a senior project manager and strategy specialist.\n\
         Based on the following Objective and Key Result, generate a detailed and actionable workflow.\n\
         The workflow must consist of {MIN_STEPS} to {MAX_STEPS} clear steps that a team can follow to reach the goal.\n\
         The initial status of every step must be \"Todo\".\n\
         \n\
         Objective: \"{objective_title}\"\n\
         Key Result: \"{key_result_title}\"\n\
         \n\
         Return the workflow as an array of JSON objects, strictly following the provided schema."
    )
}

/// JSON schema of the expected answer
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "The concise title of the workflow step."
                },
                "description": {
                    "type": "STRING",
                    "description": "A detailed explanation of what needs to be done in this step."
                },
                "status": {
                    "type": "STRING",
                    "description": "The initial status of the task, which must always be \"Todo\"."
                }
            },
            "required": ["title", "description", "status"]
        }
    })
}

/// Validate the model's answer and turn it into workflow steps
pub fn parse_steps(text: &str) -> Result<Vec<WorkflowStep>, WorkflowError> {
    let json_text = strip_code_fence(text);
    let raw: Vec<RawWorkflowStep> = serde_json::from_str(json_text)
        .map_err(|e| WorkflowError::generation(format!("invalid workflow JSON: {e}")))?;

    if !(MIN_STEPS..=MAX_STEPS).contains(&raw.len()) {
        return Err(WorkflowError::generation(format!(
            "expected {MIN_STEPS} to {MAX_STEPS} steps, got {}",
            raw.len()
        )));
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, step)| {
            let title = step.title.trim();
            let description = step.description.trim();
            if title.is_empty() || description.is_empty() {
                return Err(WorkflowError::generation(format!(
                    "step {} has an empty title or description",
                    index + 1
                )));
            }
            Ok(WorkflowStep::new(title, description))
        })
        .collect()
}

/// Drop a surrounding ```json fence if the model added one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::okr::WorkflowStatus;

    const THREE_STEPS: &str = r#"[
        {"title": "Map", "description": "Map the funnel", "status": "Todo"},
        {"title": "Build", "description": "Build the flow", "status": "Done"},
        {"title": "Launch", "description": "Launch it", "status": "In Progress"}
    ]"#;

    #[test]
    fn test_parse_forces_todo_and_fresh_ids() {
        let steps = parse_steps(THREE_STEPS).unwrap();
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|s| s.status == WorkflowStatus::Todo));
        assert_ne!(steps[0].id, steps[1].id);
        assert_eq!(steps[2].title, "Launch");
    }

    #[test]
    fn test_parse_accepts_fenced_json() {
        let fenced = format!("```json\n{THREE_STEPS}\n```");
        assert_eq!(parse_steps(&fenced).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        let cases = [
            "not json",
            r#"{"title": "Map", "description": "x", "status": "Todo"}"#,
            r#"[{"title": "Map", "description": "x", "status": "Todo"}]"#,
            r#"[{"title": 1, "description": "x", "status": "Todo"},
                {"title": "b", "description": "x", "status": "Todo"},
                {"title": "c", "description": "x", "status": "Todo"}]"#,
            r#"[{"title": "a", "description": "x"},
                {"title": "b", "description": "x", "status": "Todo"},
                {"title": "c", "description": "x", "status": "Todo"}]"#,
            r#"[{"title": " ", "description": "x", "status": "Todo"},
                {"title": "b", "description": "x", "status": "Todo"},
                {"title": "c", "description": "x", "status": "Todo"}]"#,
        ];
        for case in cases {
            let err = parse_steps(case).unwrap_err();
            assert!(matches!(err, WorkflowError::Generation { .. }), "{case}");
        }
    }

    #[test]
    fn test_parse_rejects_too_many_steps() {
        let step = r#"{"title": "a", "description": "x", "status": "Todo"}"#;
        let six = format!("[{}]", vec![step; 6].join(","));
        assert!(parse_steps(&six).is_err());
        let five = format!("[{}]", vec![step; 5].join(","));
        assert_eq!(parse_steps(&five).unwrap().len(), 5);
    }

    #[test]
    fn test_prompt_embeds_titles() {
        let prompt = build_prompt("Launch v2", "Onboard 50 customers");
        assert!(prompt.contains("Objective: \"Launch v2\""));
        assert!(prompt.contains("Key Result: \"Onboard 50 customers\""));
        assert!(prompt.contains("3 to 5"));
        assert_eq!(
            response_schema()["items"]["required"],
            json!(["title", "description", "status"])
        );
    }

    #[test]
    fn test_user_message_hides_detail() {
        let err = parse_steps("[]").unwrap_err();
        assert!(!err.to_string().contains("expected"));
        assert!(err.detail().unwrap().contains("expected 3 to 5 steps"));
    }
}
