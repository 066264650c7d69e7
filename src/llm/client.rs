use super::error::GenerationError;
use super::prompt::PromptTemplate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role tag carried by a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions
    System,
    /// User content
    User,
}

/// A role-tagged prompt plus the template that should frame it
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content to embed into the template
    pub content: String,
    /// Template selector
    pub template: PromptTemplate,
}

impl GenerationRequest {
    /// Creates a user-role request
    pub fn user(content: impl Into<String>, template: PromptTemplate) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            template,
        }
    }
}

/// Core trait for the text-generation collaborator
///
/// Implementations must be cheap to share (`Arc`) and safe to call
/// concurrently; the pipeline fans several requests out at once.
#[async_trait]
pub trait TextGenClient: Send + Sync {
    /// Generates text for the given request
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if the remote call fails, times out, or the
    /// response carries no usable text.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;

    /// Returns the human-readable name of this backend
    fn name(&self) -> &str;

    /// Returns optional model information for this backend
    fn model_info(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestClient;

    #[async_trait]
    impl TextGenClient for TestClient {
        async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
            Ok(format!("{}:{}", request.template, request.content))
        }

        fn name(&self) -> &str {
            "TestClient"
        }
    }

    #[tokio::test]
    async fn test_client_trait() {
        let client = TestClient;
        assert_eq!(client.name(), "TestClient");
        assert!(client.model_info().is_none());

        let out = client
            .generate(GenerationRequest::user("hi", PromptTemplate::RepoSummary))
            .await
            .unwrap();
        assert_eq!(out, "repo-summary:hi");
    }

    #[test]
    fn test_user_request() {
        let req = GenerationRequest::user("body", PromptTemplate::FirstFeedback);
        assert_eq!(req.role, MessageRole::User);
        assert_eq!(req.content, "body");
    }
}
