//! GenAI-based text-generation client
//!
//! This module provides a `TextGenClient` implementation using the `genai`
//! crate, supporting multiple providers (Ollama, OpenAI, Claude, Gemini, Grok,
//! Groq) through a single interface. The underlying HTTP client is created
//! once and reused across requests.

use super::client::{GenerationRequest, MessageRole, TextGenClient};
use super::error::GenerationError;
use super::prompt::PromptBuilder;
use async_trait::async_trait;
use clap::ValueEnum;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::Client;
use std::time::Duration;
use tracing::{debug, error, info};

/// Supported text-generation providers
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Ollama local inference
    Ollama,
    /// OpenAI GPT models
    OpenAI,
    /// Anthropic Claude
    Claude,
    /// Google Gemini
    Gemini,
    /// xAI Grok
    Grok,
    /// Groq
    Groq,
}

impl Provider {
    /// Returns the provider prefix for genai model strings
    fn prefix(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::OpenAI => "openai",
            Provider::Claude => "claude",
            Provider::Gemini => "gemini",
            Provider::Grok => "grok",
            Provider::Groq => "groq",
        }
    }

    /// Returns the provider name for logging
    fn name(&self) -> &'static str {
        match self {
            Provider::Ollama => "Ollama",
            Provider::OpenAI => "OpenAI",
            Provider::Claude => "Claude",
            Provider::Gemini => "Gemini",
            Provider::Grok => "Grok",
            Provider::Groq => "Groq",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAI),
            "claude" => Ok(Provider::Claude),
            "gemini" => Ok(Provider::Gemini),
            "grok" => Ok(Provider::Grok),
            "groq" => Ok(Provider::Groq),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// GenAI-backed text-generation client
///
/// # Thread Safety
///
/// This client is thread-safe and can be shared across tasks using `Arc`.
pub struct GenAiClient {
    /// GenAI client instance
    client: Client,
    /// Full model identifier (e.g., "gemini:gemini-2.0-flash")
    model: String,
    /// Provider type
    provider: Provider,
    /// Request timeout
    timeout: Duration,
}

impl GenAiClient {
    /// Creates a new client with the default 60-second timeout
    ///
    /// Provider credentials come from the usual environment variables
    /// (`GEMINI_API_KEY`, `ANTHROPIC_API_KEY`, `OPENAI_API_KEY`, ...).
    pub fn new(provider: Provider, model: String) -> Self {
        Self::with_timeout(provider, model, Duration::from_secs(60))
    }

    /// Creates a new client with a custom request timeout
    pub fn with_timeout(provider: Provider, model: String, timeout: Duration) -> Self {
        let full_model = format!("{}:{}", provider.prefix(), model);

        debug!(
            "Creating GenAI client: provider={}, model={}",
            provider.name(),
            model,
        );

        Self {
            client: Client::default(),
            model: full_model,
            provider,
            timeout,
        }
    }
}

#[async_trait]
impl TextGenClient for GenAiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let prompt = PromptBuilder::build(request.template, &request.content);

        let message = match request.role {
            MessageRole::System => ChatMessage::system(prompt),
            MessageRole::User => ChatMessage::user(prompt),
        };
        let chat_req = ChatRequest::new(vec![message]);
        let options = ChatOptions::default().with_temperature(0.3);

        debug!(
            template = %request.template,
            content_length = request.content.len(),
            "Sending request to {}",
            self.provider.name()
        );

        let start = std::time::Instant::now();

        let response = match tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(&self.model, chat_req, Some(&options)),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                error!("{} API error: {}", self.provider.name(), e);
                return Err(GenerationError::ApiError {
                    message: format!("{} request failed: {}", self.provider.name(), e),
                    status_code: None,
                });
            }
            Err(_) => {
                error!(
                    "{} request timed out after {}s",
                    self.provider.name(),
                    self.timeout.as_secs()
                );
                return Err(GenerationError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        info!(
            "{} generation ({}) completed in {:.2}s",
            self.provider.name(),
            request.template,
            start.elapsed().as_secs_f64()
        );

        let content = response
            .first_text()
            .ok_or_else(|| GenerationError::InvalidResponse {
                message: "no text content in response".to_string(),
            })?
            .to_string();

        Ok(content)
    }

    fn name(&self) -> &str {
        self.provider.name()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_prefix() {
        assert_eq!(Provider::Ollama.prefix(), "ollama");
        assert_eq!(Provider::Claude.prefix(), "claude");
        assert_eq!(Provider::Gemini.prefix(), "gemini");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert!("gpt".parse::<Provider>().is_err());
    }

    #[test]
    fn test_client_creation() {
        let client = GenAiClient::new(Provider::Gemini, "gemini-2.0-flash".to_string());
        assert_eq!(client.name(), "Gemini");
        assert_eq!(
            client.model_info(),
            Some("gemini:gemini-2.0-flash".to_string())
        );
    }

    #[test]
    fn test_custom_timeout() {
        let client = GenAiClient::with_timeout(
            Provider::Claude,
            "claude-sonnet-4-5".to_string(),
            Duration::from_secs(120),
        );
        assert_eq!(client.timeout, Duration::from_secs(120));

        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("Claude"));
    }
}
