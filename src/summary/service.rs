//! Summary orchestration service
//!
//! Drives the whole aggregation pipeline for one portfolio: insert a progress
//! record, extract documents, then run the repository and document branches
//! concurrently in a detached background task, joining them into one final
//! narrative. Submitting returns immediately after the initial insert; callers
//! observe completion by polling the progress record.

use crate::docs::DocumentExtractor;
use crate::error::ServiceError;
use crate::llm::{GenerationRequest, PromptTemplate, TextGenClient};
use crate::scm::RepoCrawler;
use crate::store::{RecordStore, RetryingUpdater, SummaryRecord, SummaryStatus};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Longest combined narrative accepted without compression, in characters
const MAX_SAFE_LENGTH: usize = 5000;

const NO_REPO_PLACEHOLDER: &str = "no repository provided";
const REPO_SUMMARY_FALLBACK: &str = "repository summary unavailable";
const NO_DOCS_PLACEHOLDER: &str = "no documents provided";
const DOC_SUMMARY_FALLBACK: &str = "document summary unavailable";

/// One summary-generation request
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub portfolio_id: String,
    pub description: String,
    /// Candidate repository URLs; the first one hosted on github.com is crawled
    pub repo_urls: Vec<String>,
    /// Locations of uploaded documents to fold into the narrative
    pub document_locations: Vec<String>,
}

/// Immediate response to a submission; completion is observed by polling
#[derive(Debug, Clone, serde::Serialize)]
pub struct SummarySubmission {
    pub record_id: Uuid,
    pub status: SummaryStatus,
}

/// Orchestrates summary generation for portfolios
#[derive(Clone)]
pub struct SummaryService {
    store: Arc<dyn RecordStore>,
    updater: RetryingUpdater,
    crawler: Arc<RepoCrawler>,
    llm: Arc<dyn TextGenClient>,
    extractor: Arc<dyn DocumentExtractor>,
}

impl SummaryService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        crawler: Arc<RepoCrawler>,
        llm: Arc<dyn TextGenClient>,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        Self {
            updater: RetryingUpdater::new(store.clone()),
            store,
            crawler,
            llm,
            extractor,
        }
    }

    /// Accepts a request and starts the pipeline
    ///
    /// The progress record is inserted in `RepoInProcessing` before anything
    /// else happens. A request with no description, no repository URLs, and no
    /// document content is parked in `NotStarted` without contacting any
    /// collaborator.
    pub async fn submit(&self, request: SummaryRequest) -> Result<SummarySubmission, ServiceError> {
        let record = SummaryRecord::new(&request.portfolio_id, &request.description);
        let record_id = record.id;
        self.store.insert_summary(record).await?;
        info!(portfolio_id = %request.portfolio_id, record_id = %record_id, "summary requested");

        let doc_texts = if request.document_locations.is_empty() {
            Vec::new()
        } else {
            self.extractor
                .extract_texts(&request.document_locations)
                .await
        };

        let no_input = request.description.trim().is_empty()
            && request.repo_urls.is_empty()
            && doc_texts.iter().all(|t| t.trim().is_empty());
        if no_input {
            info!(record_id = %record_id, "nothing to summarize");
            let record = self
                .updater
                .update_summary(record_id, |r| r.status = SummaryStatus::NotStarted)
                .await?;
            return Ok(SummarySubmission {
                record_id,
                status: record.status,
            });
        }

        let service = self.clone();
        tokio::spawn(async move {
            service.run_pipeline(record_id, request, doc_texts).await;
        });

        Ok(SummarySubmission {
            record_id,
            status: SummaryStatus::RepoInProcessing,
        })
    }

    /// Current pipeline status for the portfolio's newest record
    pub async fn status(&self, portfolio_id: &str) -> Result<SummaryStatus, ServiceError> {
        Ok(self.load(portfolio_id).await?.status)
    }

    /// The portfolio's newest summary record
    pub async fn get(&self, portfolio_id: &str) -> Result<SummaryRecord, ServiceError> {
        self.load(portfolio_id).await
    }

    /// Whether the repository changed after the newest record was created
    pub async fn is_stale(&self, portfolio_id: &str, url: &str) -> Result<bool, ServiceError> {
        let record = self.load(portfolio_id).await?;
        self.crawler.updated_since(url, record.created_at).await
    }

    async fn load(&self, portfolio_id: &str) -> Result<SummaryRecord, ServiceError> {
        self.store
            .find_summary_by_portfolio(portfolio_id)
            .await?
            .ok_or_else(|| ServiceError::SummaryNotFound(portfolio_id.to_string()))
    }

    async fn run_pipeline(self, record_id: Uuid, request: SummaryRequest, doc_texts: Vec<String>) {
        let outcome = self.run_branches(record_id, &request, doc_texts).await;
        if let Err(e) = outcome {
            warn!(record_id = %record_id, error = %e, "summary pipeline failed");
            // best effort: the record may already be unreachable
            if let Err(e) = self
                .updater
                .update_summary(record_id, |r| r.status = SummaryStatus::Failed)
                .await
            {
                warn!(record_id = %record_id, error = %e, "could not mark record failed");
            }
        }
    }

    async fn run_branches(
        &self,
        record_id: Uuid,
        request: &SummaryRequest,
        doc_texts: Vec<String>,
    ) -> Result<(), ServiceError> {
        let repo_branch = async {
            let summary = self.summarize_repository(&request.repo_urls).await;
            self.updater
                .update_summary(record_id, |r| {
                    r.repo_summary = Some(summary.clone());
                    r.status.advance(SummaryStatus::DocInProcessing);
                })
                .await?;
            Ok::<String, ServiceError>(summary)
        };

        let doc_branch = async {
            let summary = self.summarize_documents(&doc_texts).await;
            self.updater
                .update_summary(record_id, |r| {
                    r.doc_summary = Some(summary.clone());
                    r.status.advance(SummaryStatus::Combining);
                })
                .await?;
            Ok::<String, ServiceError>(summary)
        };

        let (repo_summary, doc_summary) = tokio::join!(repo_branch, doc_branch);
        let (repo_summary, doc_summary) = (repo_summary?, doc_summary?);

        let combined = format!("{}\n{}\n{}", request.description, repo_summary, doc_summary);
        let final_summary = if needs_compression(&combined) {
            // compression failure is terminal for the run
            self.llm
                .generate(GenerationRequest::user(
                    combined,
                    PromptTemplate::CombinedSummary,
                ))
                .await
                .map_err(|e| ServiceError::ExternalCallFailure(e.to_string()))?
        } else {
            combined
        };

        self.updater
            .update_summary(record_id, |r| {
                r.final_summary = Some(final_summary.clone());
                r.status.advance(SummaryStatus::Completed);
            })
            .await?;
        info!(record_id = %record_id, "summary completed");
        Ok(())
    }

    async fn summarize_repository(&self, repo_urls: &[String]) -> String {
        let Some(url) = repo_urls.iter().find(|u| u.contains("github.com")) else {
            return NO_REPO_PLACEHOLDER.to_string();
        };

        let snapshot = match self.crawler.crawl(url).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(url, error = %e, "repository crawl failed");
                return REPO_SUMMARY_FALLBACK.to_string();
            }
        };

        let sections = snapshot.into_sections().join("\n");
        match self
            .llm
            .generate(GenerationRequest::user(sections, PromptTemplate::RepoSummary))
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                warn!(url, error = %e, "repository summarization failed");
                REPO_SUMMARY_FALLBACK.to_string()
            }
        }
    }

    async fn summarize_documents(&self, doc_texts: &[String]) -> String {
        let combined = doc_texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        if combined.is_empty() {
            return NO_DOCS_PLACEHOLDER.to_string();
        }

        match self
            .llm
            .generate(GenerationRequest::user(
                combined,
                PromptTemplate::DocumentSummary,
            ))
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "document summarization failed");
                DOC_SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

/// Whether the combined narrative exceeds the safe prompt length
fn needs_compression(combined: &str) -> bool {
    combined.chars().count() > MAX_SAFE_LENGTH
}
