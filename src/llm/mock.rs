use super::client::{GenerationRequest, TextGenClient};
use super::error::GenerationError;
use super::prompt::PromptTemplate;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted text-generation client for tests
///
/// Responses are queued per template, so concurrent pipeline branches each
/// consume their own script regardless of scheduling order. Every request is
/// recorded for later assertions.
pub struct MockTextGenClient {
    responses: Mutex<HashMap<PromptTemplate, VecDeque<MockGenResponse>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

/// One scripted response
#[derive(Debug, Clone)]
pub struct MockGenResponse {
    result: Result<String, GenerationError>,
    delay: Duration,
}

impl MockGenResponse {
    /// A successful response
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            result: Ok(content.into()),
            delay: Duration::ZERO,
        }
    }

    /// A failing response
    pub fn error(error: GenerationError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    /// Delays the response, useful for forcing a completion order in tests
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl MockTextGenClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response for the given template
    pub fn script(&self, template: PromptTemplate, response: MockGenResponse) {
        self.responses
            .lock()
            .unwrap()
            .entry(template)
            .or_default()
            .push_back(response);
    }

    /// Returns every request received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received for a template
    pub fn calls_for(&self, template: PromptTemplate) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.template == template)
            .count()
    }

    /// Total number of requests received
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockTextGenClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenClient for MockTextGenClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());

        let response = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&request.template)
            .and_then(|queue| queue.pop_front())
            .ok_or_else(|| GenerationError::Other {
                message: format!(
                    "MockTextGenClient: no scripted response for {}",
                    request.template
                ),
            })?;

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        response.result
    }

    fn name(&self) -> &str {
        "MockTextGen"
    }
}
