//! Configuration management for folioscope
//!
//! Settings load from environment variables with sensible defaults. Besides
//! provider selection and timeouts, configuration covers the GitHub token used
//! by the repository crawler.
//!
//! # Environment Variables
//!
//! ## Folioscope Configuration
//! - `FOLIOSCOPE_PROVIDER`: Provider selection (ollama|openai|claude|gemini|grok|groq) - default: "ollama"
//! - `FOLIOSCOPE_MODEL`: Model name - default: provider-specific
//! - `FOLIOSCOPE_LOG_LEVEL`: Logging level - default: "info"
//! - `FOLIOSCOPE_REQUEST_TIMEOUT`: Text-generation timeout in seconds - default: "60"
//! - `FOLIOSCOPE_GITHUB_TOKEN`: GitHub API token - optional, unauthenticated
//!   requests work for public repositories within rate limits
//!
//! ## GenAI Provider Configuration
//! These environment variables are read directly by the genai library:
//! - **Ollama**: `OLLAMA_HOST` (default: http://localhost:11434)
//! - **OpenAI**: `OPENAI_API_KEY` (required), `OPENAI_API_BASE` (optional)
//! - **Claude**: `ANTHROPIC_API_KEY` (required), `ANTHROPIC_BASE_URL` (optional)
//! - **Gemini**: `GOOGLE_API_KEY` (required)
//! - **Grok**: `XAI_API_KEY` (required)
//! - **Groq**: `GROQ_API_KEY` (required)

use crate::llm::{GenAiClient, Provider};
use crate::scm::GitHubApi;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid provider name
    #[error("Invalid provider: {0}. Valid options: ollama, openai, claude, gemini, grok, groq")]
    InvalidProvider(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for folioscope
///
/// Constructed with `Default::default()`, which loads from environment
/// variables with fallback defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Text-generation provider (from genai)
    pub provider: Provider,

    /// Model name to use for generation (provider-specific)
    pub model: String,

    /// GitHub API token; `None` means unauthenticated requests
    pub github_token: Option<String>,

    /// Text-generation request timeout in seconds
    pub request_timeout_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for AppConfig {
    /// Loads configuration from environment variables with defaults
    ///
    /// Provider-specific credentials (API keys, endpoints) are read by genai
    /// itself from its standard environment variables.
    fn default() -> Self {
        let provider = env::var("FOLIOSCOPE_PROVIDER")
            .ok()
            .and_then(|s| s.parse::<Provider>().ok())
            .unwrap_or(Provider::Ollama);

        let model = env::var("FOLIOSCOPE_MODEL")
            .ok()
            .unwrap_or_else(|| match provider {
                Provider::Ollama => DEFAULT_OLLAMA_MODEL.to_string(),
                _ => "default-model".to_string(),
            });

        let github_token = env::var("FOLIOSCOPE_GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        let request_timeout_secs = env::var("FOLIOSCOPE_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_level = env::var("FOLIOSCOPE_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            github_token,
            request_timeout_secs,
            log_level,
        }
    }
}

impl AppConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any value is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Creates the text-generation client for the configured provider
    pub fn create_text_gen(&self) -> Arc<GenAiClient> {
        Arc::new(GenAiClient::with_timeout(
            self.provider,
            self.model.clone(),
            Duration::from_secs(self.request_timeout_secs),
        ))
    }

    /// Creates the GitHub client, authenticated when a token is configured
    pub fn create_scm(&self) -> Arc<GitHubApi> {
        Arc::new(GitHubApi::new(self.github_token.clone().unwrap_or_default()))
    }
}

impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Folioscope Configuration:")?;
        writeln!(f, "  Provider: {:?}", self.provider)?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(
            f,
            "  GitHub Token: {}",
            if self.github_token.is_some() {
                "set"
            } else {
                "unset"
            }
        )?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
