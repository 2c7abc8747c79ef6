//! AI provider abstraction layer
//!
//! A single-shot text generation interface. The dashboard only needs one
//! structured completion per request, so there is no streaming or tool use.

pub mod google;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request to generate a completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    /// MIME type the model must answer with (e.g. `application/json`)
    pub response_mime_type: Option<String>,
    /// JSON schema constraining the response
    pub response_schema: Option<serde_json::Value>,
    /// Token budget for model reasoning, `Some(0)` disables it
    pub thinking_budget: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            response_mime_type: None,
            response_schema: None,
            thinking_budget: None,
        }
    }

    /// Ask for a JSON answer matching `schema`
    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self.response_schema = Some(schema);
        self
    }

    pub fn with_thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.thinking_budget = budget;
        self
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Error,
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: FinishReason,
}

/// Provider trait that all AI providers must implement
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Generate a completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}
