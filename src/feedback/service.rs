//! Feedback generation service
//!
//! Each feedback request chains the portfolio's completed narrative and the
//! most recent prior feedback into a new prompt, so consecutive rounds build
//! on each other instead of starting cold. Generation runs detached: the
//! record is inserted `InProcessing` and the caller polls for completion.
//!
//! Prior feedback is resolved per portfolio, not per note, so a round for one
//! note can pick up the feedback written for another. That behavior is pinned
//! by a test.

use crate::error::ServiceError;
use crate::llm::{GenerationRequest, PromptTemplate, TextGenClient};
use crate::store::{
    FeedbackRecord, FeedbackStatus, RecordStore, RetryingUpdater, SummaryStatus,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Client-facing view of one feedback record
#[derive(Debug, Clone, serde::Serialize)]
pub struct FeedbackView {
    pub id: Uuid,
    pub status: FeedbackStatus,
    /// `None` while in processing and forever after a failed run
    pub text: Option<String>,
}

impl From<FeedbackRecord> for FeedbackView {
    fn from(record: FeedbackRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            text: record.text,
        }
    }
}

/// Generates and serves feedback records
#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<dyn RecordStore>,
    updater: RetryingUpdater,
    llm: Arc<dyn TextGenClient>,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn RecordStore>, llm: Arc<dyn TextGenClient>) -> Self {
        Self {
            updater: RetryingUpdater::new(store.clone()),
            store,
            llm,
        }
    }

    /// Starts a feedback round for one note of a portfolio
    ///
    /// The portfolio's summary must exist and be `Completed`. The returned
    /// view is `InProcessing`; generation completes in a detached task.
    pub async fn generate(
        &self,
        portfolio_id: &str,
        note_id: i64,
        note_content: &str,
    ) -> Result<FeedbackView, ServiceError> {
        let narrative = self.completed_narrative(portfolio_id).await?;
        let prior = self.store.find_latest_feedback(portfolio_id).await?;
        let prior_text = prior.and_then(|p| p.text);

        let mut data = format!(
            "[note content] {}\n[portfolio summary] {}\n",
            note_content, narrative
        );
        let template = match &prior_text {
            Some(text) => {
                data.push_str(&format!("[previous feedback] {}\n", text));
                PromptTemplate::ContinuationFeedback
            }
            None => PromptTemplate::FirstFeedback,
        };

        self.start_round(portfolio_id, note_id, data, template).await
    }

    /// Starts a recruiter-perspective feedback round
    ///
    /// Same preconditions as [`Self::generate`], but the prompt never chains
    /// prior feedback; each HR round stands alone.
    pub async fn generate_hr(
        &self,
        portfolio_id: &str,
        note_id: i64,
        note_content: &str,
    ) -> Result<FeedbackView, ServiceError> {
        let narrative = self.completed_narrative(portfolio_id).await?;
        let data = format!(
            "[note content] {}\n[portfolio summary] {}\n",
            note_content, narrative
        );
        self.start_round(portfolio_id, note_id, data, PromptTemplate::HrFeedback)
            .await
    }

    /// One record by id; an in-processing record is returned as-is
    pub async fn get(&self, feedback_id: Uuid) -> Result<FeedbackView, ServiceError> {
        self.store
            .find_feedback(feedback_id)
            .await?
            .map(FeedbackView::from)
            .ok_or_else(|| ServiceError::FeedbackNotFound(feedback_id.to_string()))
    }

    /// Newest record for the exact (portfolio, note) pair
    pub async fn get_latest(
        &self,
        portfolio_id: &str,
        note_id: i64,
    ) -> Result<FeedbackView, ServiceError> {
        self.store
            .find_latest_feedback_for_note(portfolio_id, note_id)
            .await?
            .map(FeedbackView::from)
            .ok_or_else(|| {
                ServiceError::FeedbackNotFound(format!("{}/note {}", portfolio_id, note_id))
            })
    }

    /// Every record for the portfolio, oldest first
    pub async fn list(&self, portfolio_id: &str) -> Result<Vec<FeedbackView>, ServiceError> {
        let records = self.store.find_feedback_by_portfolio(portfolio_id).await?;
        if records.is_empty() {
            return Err(ServiceError::FeedbackNotFound(portfolio_id.to_string()));
        }
        Ok(records.into_iter().map(FeedbackView::from).collect())
    }

    /// Latest feedback for each note id, skipping notes that resolve to nothing
    ///
    /// Successes keep the relative order of `note_ids`.
    pub async fn get_batch(&self, portfolio_id: &str, note_ids: &[i64]) -> Vec<FeedbackView> {
        let mut views = Vec::with_capacity(note_ids.len());
        for &note_id in note_ids {
            match self.get_latest(portfolio_id, note_id).await {
                Ok(view) => views.push(view),
                Err(e) => {
                    warn!(portfolio_id, note_id, error = %e, "skipping note in batch lookup");
                }
            }
        }
        views
    }

    async fn completed_narrative(&self, portfolio_id: &str) -> Result<String, ServiceError> {
        let summary = self
            .store
            .find_summary_by_portfolio(portfolio_id)
            .await?
            .ok_or_else(|| ServiceError::SummaryNotFound(portfolio_id.to_string()))?;
        if summary.status != SummaryStatus::Completed {
            return Err(ServiceError::SummaryNotCompleted(portfolio_id.to_string()));
        }
        Ok(summary.final_summary.unwrap_or_default())
    }

    async fn start_round(
        &self,
        portfolio_id: &str,
        note_id: i64,
        data: String,
        template: PromptTemplate,
    ) -> Result<FeedbackView, ServiceError> {
        let record = FeedbackRecord::new(portfolio_id, note_id);
        let view = FeedbackView::from(record.clone());
        self.store.insert_feedback(record).await?;
        info!(portfolio_id, note_id, record_id = %view.id, template = %template, "feedback requested");

        let service = self.clone();
        let record_id = view.id;
        tokio::spawn(async move {
            service.complete(record_id, data, template).await;
        });

        Ok(view)
    }

    async fn complete(self, record_id: Uuid, data: String, template: PromptTemplate) {
        let generated = self
            .llm
            .generate(GenerationRequest::user(data, template))
            .await;

        let outcome = match generated {
            Ok(text) => {
                self.updater
                    .update_feedback(record_id, |r| {
                        r.text = Some(text.clone());
                        r.status = FeedbackStatus::Completed;
                    })
                    .await
            }
            Err(e) => {
                warn!(record_id = %record_id, error = %e, "feedback generation failed");
                self.updater
                    .update_feedback(record_id, |r| r.status = FeedbackStatus::Failed)
                    .await
            }
        };

        if let Err(e) = outcome {
            warn!(record_id = %record_id, error = %e, "could not record feedback outcome");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockGenResponse, MockTextGenClient};
    use crate::store::{MemoryStore, SummaryRecord};
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        llm: Arc<MockTextGenClient>,
        service: FeedbackService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let llm = Arc::new(MockTextGenClient::new());
        let service = FeedbackService::new(store.clone(), llm.clone());
        Fixture {
            store,
            llm,
            service,
        }
    }

    async fn insert_completed_summary(store: &MemoryStore, portfolio_id: &str, narrative: &str) {
        let mut record = SummaryRecord::new(portfolio_id, "desc");
        record.status = SummaryStatus::Completed;
        record.final_summary = Some(narrative.to_string());
        store.insert_summary(record).await.unwrap();
    }

    async fn wait_done(store: &MemoryStore, id: Uuid) -> FeedbackRecord {
        for _ in 0..200 {
            let record = store.find_feedback(id).await.unwrap().unwrap();
            if record.status != FeedbackStatus::InProcessing {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("feedback {} never completed", id);
    }

    #[tokio::test]
    async fn test_requires_existing_summary() {
        let f = fixture();
        let err = f.service.generate("pf-1", 1, "note").await.unwrap_err();
        assert!(matches!(err, ServiceError::SummaryNotFound(_)));
    }

    #[tokio::test]
    async fn test_requires_completed_summary() {
        let f = fixture();
        let record = SummaryRecord::new("pf-1", "desc");
        f.store.insert_summary(record).await.unwrap();

        let err = f.service.generate("pf-1", 1, "note").await.unwrap_err();
        assert!(matches!(err, ServiceError::SummaryNotCompleted(_)));
    }

    #[tokio::test]
    async fn test_first_round_uses_first_feedback_template() {
        let f = fixture();
        insert_completed_summary(&f.store, "pf-1", "the narrative").await;
        f.llm.script(
            PromptTemplate::FirstFeedback,
            MockGenResponse::text("well done"),
        );

        let view = f.service.generate("pf-1", 1, "my note").await.unwrap();
        assert_eq!(view.status, FeedbackStatus::InProcessing);
        assert!(view.text.is_none());

        let record = wait_done(&f.store, view.id).await;
        assert_eq!(record.status, FeedbackStatus::Completed);
        assert_eq!(record.text.as_deref(), Some("well done"));

        let requests = f.llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].content.contains("[note content] my note"));
        assert!(requests[0].content.contains("[portfolio summary] the narrative"));
        assert!(!requests[0].content.contains("[previous feedback]"));
    }

    #[tokio::test]
    async fn test_second_round_chains_prior_feedback() {
        let f = fixture();
        insert_completed_summary(&f.store, "pf-1", "the narrative").await;
        f.llm.script(
            PromptTemplate::FirstFeedback,
            MockGenResponse::text("round one"),
        );
        f.llm.script(
            PromptTemplate::ContinuationFeedback,
            MockGenResponse::text("round two"),
        );

        let first = f.service.generate("pf-1", 1, "note v1").await.unwrap();
        wait_done(&f.store, first.id).await;

        let second = f.service.generate("pf-1", 1, "note v2").await.unwrap();
        let record = wait_done(&f.store, second.id).await;
        assert_eq!(record.text.as_deref(), Some("round two"));

        let continuation = f.llm.requests().into_iter().last().unwrap();
        assert_eq!(continuation.template, PromptTemplate::ContinuationFeedback);
        assert!(continuation.content.contains("[previous feedback] round one"));
    }

    #[tokio::test]
    async fn test_failed_prior_round_restarts_cold() {
        let f = fixture();
        insert_completed_summary(&f.store, "pf-1", "n").await;
        // no scripted first-feedback response: the first round fails
        let first = f.service.generate("pf-1", 1, "note").await.unwrap();
        let record = wait_done(&f.store, first.id).await;
        assert_eq!(record.status, FeedbackStatus::Failed);

        // a failed round leaves no text, so the next round starts cold
        f.llm.script(
            PromptTemplate::FirstFeedback,
            MockGenResponse::text("fresh start"),
        );
        let second = f.service.generate("pf-1", 1, "note v2").await.unwrap();
        let record = wait_done(&f.store, second.id).await;
        assert_eq!(record.text.as_deref(), Some("fresh start"));

        let request = f.llm.requests().into_iter().last().unwrap();
        assert_eq!(request.template, PromptTemplate::FirstFeedback);
        assert!(!request.content.contains("[previous feedback]"));
    }

    #[tokio::test]
    async fn test_hr_round_never_chains_prior_feedback() {
        let f = fixture();
        insert_completed_summary(&f.store, "pf-1", "the narrative").await;
        f.llm
            .script(PromptTemplate::FirstFeedback, MockGenResponse::text("dev view"));
        f.llm
            .script(PromptTemplate::HrFeedback, MockGenResponse::text("hr view"));

        let first = f.service.generate("pf-1", 1, "note").await.unwrap();
        wait_done(&f.store, first.id).await;

        let hr = f.service.generate_hr("pf-1", 1, "note").await.unwrap();
        let record = wait_done(&f.store, hr.id).await;
        assert_eq!(record.text.as_deref(), Some("hr view"));

        let hr_request = f.llm.requests().into_iter().last().unwrap();
        assert_eq!(hr_request.template, PromptTemplate::HrFeedback);
        assert!(!hr_request.content.contains("[previous feedback]"));
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_text_null() {
        let f = fixture();
        insert_completed_summary(&f.store, "pf-1", "n").await;
        // no scripted first-feedback response: generation fails

        let view = f.service.generate("pf-1", 1, "note").await.unwrap();
        let record = wait_done(&f.store, view.id).await;
        assert_eq!(record.status, FeedbackStatus::Failed);
        assert!(record.text.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_and_in_processing() {
        let f = fixture();
        let err = f.service.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::FeedbackNotFound(_)));

        let record = FeedbackRecord::new("pf-1", 1);
        let id = record.id;
        f.store.insert_feedback(record).await.unwrap();

        let view = f.service.get(id).await.unwrap();
        assert_eq!(view.status, FeedbackStatus::InProcessing);
        assert!(view.text.is_none());
    }

    #[tokio::test]
    async fn test_list_empty_is_not_found() {
        let f = fixture();
        let err = f.service.list("pf-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::FeedbackNotFound(_)));
    }

    #[tokio::test]
    async fn test_batch_skips_missing_notes_and_keeps_order() {
        let f = fixture();
        insert_completed_summary(&f.store, "pf-1", "n").await;
        f.llm
            .script(PromptTemplate::FirstFeedback, MockGenResponse::text("a"));
        f.llm.script(
            PromptTemplate::ContinuationFeedback,
            MockGenResponse::text("b"),
        );

        let one = f.service.generate("pf-1", 1, "note 1").await.unwrap();
        wait_done(&f.store, one.id).await;
        let three = f.service.generate("pf-1", 3, "note 3").await.unwrap();
        wait_done(&f.store, three.id).await;

        let views = f.service.get_batch("pf-1", &[1, 2, 3]).await;
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].text.as_deref(), Some("a"));
        assert_eq!(views[1].text.as_deref(), Some("b"));
    }
}
