//! folioscope - AI-powered portfolio summarization and iterative feedback
//!
//! This library aggregates heterogeneous evidence about a portfolio project —
//! a source-control repository, uploaded documents, and a free-text
//! description — into one synthesized narrative using Large Language Models
//! (LLMs), then produces iterative, context-aware feedback as the portfolio
//! evolves.
//!
//! # Core Concepts
//!
//! - **Summary pipeline**: repository and document evidence are analyzed
//!   concurrently and joined into one narrative; progress is tracked in a
//!   persisted record with a monotonic state machine
//! - **Retrying updater**: every record mutation is a version-checked
//!   read-modify-write, retried on optimistic-concurrency conflicts
//! - **Iterative feedback**: each feedback round chains the portfolio
//!   narrative and the most recent prior feedback into the next prompt
//!
//! # Example Usage
//!
//! ```ignore
//! use folioscope::config::AppConfig;
//! use folioscope::docs::HttpDocumentExtractor;
//! use folioscope::scm::RepoCrawler;
//! use folioscope::store::MemoryStore;
//! use folioscope::summary::{SummaryRequest, SummaryService};
//! use std::sync::Arc;
//!
//! async fn summarize() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::default();
//!     let llm = config.create_text_gen();
//!     let store = Arc::new(MemoryStore::new());
//!     let crawler = Arc::new(RepoCrawler::new(config.create_scm(), llm.clone()));
//!     let service = SummaryService::new(
//!         store,
//!         crawler,
//!         llm,
//!         Arc::new(HttpDocumentExtractor::new()),
//!     );
//!
//!     let submission = service
//!         .submit(SummaryRequest {
//!             portfolio_id: "pf-1".to_string(),
//!             description: "my side project".to_string(),
//!             repo_urls: vec!["https://github.com/me/project".to_string()],
//!             document_locations: vec![],
//!         })
//!         .await?;
//!     println!("record {} accepted", submission.record_id);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`summary`]: the aggregation pipeline orchestrator
//! - [`feedback`]: the iterative feedback generator
//! - [`scm`]: source-control access, crawling, and signature analysis
//! - [`llm`]: text-generation clients and prompt templates
//! - [`store`]: progress records and the optimistic-concurrency updater
//! - [`docs`]: best-effort document retrieval

// Public modules
pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod feedback;
pub mod llm;
pub mod scm;
pub mod store;
pub mod summary;
pub mod util;

// Re-export key types for convenient access
pub use config::{AppConfig, ConfigError};
pub use error::ServiceError;
pub use feedback::{FeedbackService, FeedbackView};
pub use llm::{GenAiClient, GenerationError, PromptTemplate, Provider, TextGenClient};
pub use scm::{GitHubApi, RepoCrawler, RepoRef, SourceControlApi};
pub use store::{
    FeedbackRecord, FeedbackStatus, MemoryStore, RecordStore, RetryingUpdater, StoreError,
    SummaryRecord, SummaryStatus,
};
pub use summary::{SummaryRequest, SummaryService, SummarySubmission};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_folioscope() {
        assert_eq!(NAME, "folioscope");
    }
}
