//! Portfolio document retrieval
//!
//! Documents are referenced by location (URL) and fetched as plain text.
//! Retrieval is deliberately lossy: a document that cannot be fetched
//! contributes an empty string rather than failing the caller, mirroring the
//! degrade-not-abort posture of the repository crawler.

use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Fetches document texts by location
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Texts for the given locations, one entry per location, in order
    ///
    /// Locations that cannot be fetched yield an empty string.
    async fn extract_texts(&self, locations: &[String]) -> Vec<String>;
}

/// HTTP-backed extractor
pub struct HttpDocumentExtractor {
    client: reqwest::Client,
}

impl HttpDocumentExtractor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_one(&self, location: &str) -> String {
        debug!(location, "fetching document");
        let result = async {
            self.client
                .get(location)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        }
        .await;

        match result {
            Ok(text) => text,
            Err(e) => {
                warn!(location, error = %e, "document fetch failed");
                String::new()
            }
        }
    }
}

impl Default for HttpDocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for HttpDocumentExtractor {
    async fn extract_texts(&self, locations: &[String]) -> Vec<String> {
        join_all(locations.iter().map(|location| self.fetch_one(location))).await
    }
}

/// Test extractor returning preset texts keyed by location
pub struct MockDocumentExtractor {
    texts: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
}

impl MockDocumentExtractor {
    pub fn new() -> Self {
        Self {
            texts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn add_document(&self, location: impl Into<String>, text: impl Into<String>) {
        self.texts.lock().unwrap().push((location.into(), text.into()));
    }

    /// Number of `extract_texts` calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockDocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for MockDocumentExtractor {
    async fn extract_texts(&self, locations: &[String]) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let texts = self.texts.lock().unwrap();
        locations
            .iter()
            .map(|location| {
                texts
                    .iter()
                    .find(|(known, _)| known == location)
                    .map(|(_, text)| text.clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_texts_in_order() {
        let extractor = MockDocumentExtractor::new();
        extractor.add_document("a", "first");
        extractor.add_document("b", "second");

        let texts = extractor
            .extract_texts(&["b".to_string(), "a".to_string()])
            .await;
        assert_eq!(texts, vec!["second".to_string(), "first".to_string()]);
        assert_eq!(extractor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_unknown_location_is_empty() {
        let extractor = MockDocumentExtractor::new();
        let texts = extractor.extract_texts(&["missing".to_string()]).await;
        assert_eq!(texts, vec![String::new()]);
    }
}
