//! Configuration system
//!
//! Handles loading configuration from multiple sources:
//! - Global config (~/.config/okrboard/config.toml)
//! - Project config (./okrboard.toml or .okrboard/config.toml)
//! - Environment variables (GEMINI_API_KEY, OKRBOARD_*)

use crate::okr::export::PageLayout;
use crate::workflow::DEFAULT_MODEL;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Gemini text-generation settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Logbook export settings
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (can also be set via env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model used for workflow generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// HTTP request timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Reasoning token budget; 0 favours fast answers, a negative value
    /// leaves the choice to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<i64>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<REDACTED>"))
            .field("api_key_len", &self.api_key.as_ref().map(|k| k.len()))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("thinking_budget", &self.thinking_budget)
            .finish()
    }
}

/// Stored thinking budget meaning "let the model decide"
pub const MODEL_DEFAULT_THINKING_BUDGET: i64 = -1;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LINE_WIDTH: usize = 90;

impl GeminiConfig {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Budget to send with requests; `None` omits it
    pub fn thinking_budget(&self) -> Option<u32> {
        match self.thinking_budget {
            None => Some(0),
            Some(budget) => u32::try_from(budget).ok(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Characters per wrapped line in exported documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<usize>,
}

impl ExportConfig {
    pub fn line_width(&self) -> usize {
        self.line_width.unwrap_or(DEFAULT_LINE_WIDTH)
    }

    /// Page layout for logbook exports
    pub fn page_layout(&self) -> PageLayout {
        PageLayout::default().with_line_width(self.line_width())
    }
}

impl Config {
    /// Load configuration from all sources (global, project, env)
    pub async fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            config = config.merge(Self::load_file(&global_path).await?);
        }

        // Load project config
        for name in ["okrboard.toml", ".okrboard/config.toml"] {
            let path = PathBuf::from(name);
            if path.exists() {
                config = config.merge(Self::load_file(&path).await?);
            }
        }

        // Apply environment overrides
        config.apply_env();

        Ok(config)
    }

    /// Parse a single TOML config file
    pub async fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "okrboard", "okrboard")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Every setting spelled out with its built-in value
    pub fn defaults() -> Self {
        Self {
            gemini: GeminiConfig {
                api_key: None,
                base_url: None,
                model: Some(DEFAULT_MODEL.to_string()),
                request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
                thinking_budget: Some(0),
            },
            export: ExportConfig {
                line_width: Some(DEFAULT_LINE_WIDTH),
            },
        }
    }

    /// Fill every unset key with its built-in value
    pub fn resolved(self) -> Self {
        Self::defaults().merge(self)
    }

    /// Initialize default configuration file
    pub async fn init_default() -> Result<()> {
        if let Some(path) = Self::global_config_path() {
            Self::defaults().save(&path).await?;
            tracing::info!(path = %path.display(), "Created config");
        }
        Ok(())
    }

    /// Write this configuration as TOML
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Set a configuration value in the global config
    pub async fn set(key: &str, value: &str) -> Result<()> {
        let mut config = Self::load().await?;
        config.set_value(key, value)?;

        if let Some(path) = Self::global_config_path() {
            config.save(&path).await?;
        }
        Ok(())
    }

    /// Assign a dotted key
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "gemini.api_key" => self.gemini.api_key = Some(value.to_string()),
            "gemini.base_url" => self.gemini.base_url = Some(value.to_string()),
            "gemini.model" => self.gemini.model = Some(value.to_string()),
            "gemini.request_timeout_secs" => {
                self.gemini.request_timeout_secs = Some(
                    value
                        .trim()
                        .parse()
                        .with_context(|| format!("Invalid timeout: {value}"))?,
                )
            }
            "gemini.thinking_budget" => {
                self.gemini.thinking_budget = Some(match value.trim() {
                    "" | "none" => MODEL_DEFAULT_THINKING_BUDGET,
                    budget => budget
                        .parse::<u32>()
                        .with_context(|| format!("Invalid thinking budget: {value}"))?
                        .into(),
                })
            }
            "export.line_width" => {
                let width: usize = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid line width: {value}"))?;
                if width == 0 {
                    anyhow::bail!("Line width must be positive");
                }
                self.export.line_width = Some(width);
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Merge two configs (other takes precedence)
    fn merge(mut self, other: Self) -> Self {
        if other.gemini.api_key.is_some() {
            self.gemini.api_key = other.gemini.api_key;
        }
        if other.gemini.base_url.is_some() {
            self.gemini.base_url = other.gemini.base_url;
        }
        if other.gemini.model.is_some() {
            self.gemini.model = other.gemini.model;
        }
        if other.gemini.request_timeout_secs.is_some() {
            self.gemini.request_timeout_secs = other.gemini.request_timeout_secs;
        }
        if other.gemini.thinking_budget.is_some() {
            self.gemini.thinking_budget = other.gemini.thinking_budget;
        }
        if other.export.line_width.is_some() {
            self.export.line_width = other.export.line_width;
        }
        self
    }

    /// Apply environment variable overrides
    fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    fn apply_env_with(&mut self, get: impl Fn(&str) -> Option<String>) {
        // First match wins; API_KEY is the name the hosted dashboard injects
        if let Some(key) = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"]
            .into_iter()
            .find_map(|name| get(name).filter(|v| !v.is_empty()))
        {
            self.gemini.api_key = Some(key);
        }
        if let Some(val) = get("OKRBOARD_MODEL") {
            self.gemini.model = Some(val);
        }
        if let Some(val) = get("OKRBOARD_GEMINI_BASE_URL") {
            self.gemini.base_url = Some(val);
        }
    }
}
