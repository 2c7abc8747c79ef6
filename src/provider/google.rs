//! Google Gemini provider implementation
//!
//! Talks to the native `generateContent` endpoint, which accepts a response
//! schema for structured JSON output.
//! Reference: https://ai.google.dev/api/generate-content

use super::{CompletionRequest, CompletionResponse, FinishReason, Provider, Usage};
use crate::config::GeminiConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider")
            .field("api_key", &"<REDACTED>")
            .field("api_key_len", &self.api_key.len())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GoogleProvider {
    pub fn new(api_key: String, base_url: Option<String>, timeout: Duration) -> Result<Self> {
        tracing::debug!(
            provider = "google",
            api_key_len = api_key.len(),
            timeout_secs = timeout.as_secs(),
            "Creating Google Gemini provider"
        );
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| GEMINI_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Build a provider from the `[gemini]` config section
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("Gemini API key is not configured (set GEMINI_API_KEY)")?;
        Self::new(
            api_key,
            config.base_url.clone(),
            config.request_timeout(),
        )
    }

    fn validate_api_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            anyhow::bail!("Google API key is empty");
        }
        Ok(())
    }

    fn build_body(request: &CompletionRequest) -> Value {
        let mut generation_config = json!({});
        if let Some(mime) = &request.response_mime_type {
            generation_config["responseMimeType"] = json!(mime);
        }
        if let Some(schema) = &request.response_schema {
            generation_config["responseSchema"] = schema.clone();
        }
        if let Some(budget) = request.thinking_budget {
            generation_config["thinkingConfig"] = json!({ "thinkingBudget": budget });
        }

        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }],
            "generationConfig": generation_config,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl Provider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        tracing::debug!(
            provider = "google",
            model = %request.model,
            prompt_len = request.prompt.len(),
            structured = request.response_schema.is_some(),
            "Starting Google Gemini completion request"
        );

        self.validate_api_key()?;

        let body = Self::build_body(&request);
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Google Gemini")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read Google Gemini response")?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ApiError>(&text) {
                anyhow::bail!("Google Gemini API error: {}", err.error.message);
            }
            anyhow::bail!("Google Gemini API error: {} {}", status, text);
        }

        parse_response(&text)
    }
}

fn parse_response(text: &str) -> Result<CompletionResponse> {
    let parsed: GenerateContentResponse = serde_json::from_str(text).with_context(|| {
        format!(
            "Failed to parse Google Gemini response: {}",
            text.chars().take(200).collect::<String>()
        )
    })?;

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .context("No candidates in Google Gemini response")?;

    let content: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let finish_reason = match candidate.finish_reason.as_deref() {
        Some("STOP") | None => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
            FinishReason::ContentFilter
        }
        Some(_) => FinishReason::Error,
    };

    let usage = parsed.usage_metadata.as_ref();
    Ok(CompletionResponse {
        text: content,
        usage: Usage {
            prompt_tokens: usage.map(|u| u.prompt_token_count).unwrap_or(0),
            completion_tokens: usage.map(|u| u.candidates_token_count).unwrap_or(0),
            total_tokens: usage.map(|u| u.total_token_count).unwrap_or(0),
        },
        finish_reason,
    })
}
