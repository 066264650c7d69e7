//! Progress and feedback record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress state of one summary-generation attempt
///
/// Transitions are monotonic per record:
/// `RepoInProcessing → DocInProcessing → Combining → {Completed | Failed}`,
/// plus `RepoInProcessing → NotStarted` when a request arrives with no input
/// sources at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryStatus {
    NotStarted,
    RepoInProcessing,
    DocInProcessing,
    Combining,
    Completed,
    Failed,
}

impl SummaryStatus {
    /// Whether this state can never change again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SummaryStatus::NotStarted | SummaryStatus::Completed | SummaryStatus::Failed
        )
    }

    /// Moves to `next` unless the record already progressed past it
    ///
    /// The repository and document branches commit their progress states
    /// concurrently; the slower branch must not rewind the faster one.
    pub fn advance(&mut self, next: SummaryStatus) {
        if next.phase() > self.phase() {
            *self = next;
        }
    }

    fn phase(self) -> u8 {
        match self {
            SummaryStatus::NotStarted => 0,
            SummaryStatus::RepoInProcessing => 1,
            SummaryStatus::DocInProcessing => 2,
            SummaryStatus::Combining => 3,
            SummaryStatus::Completed | SummaryStatus::Failed => 4,
        }
    }
}

/// State of one feedback record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackStatus {
    InProcessing,
    Completed,
    Failed,
}

/// Persisted state of one summary-generation attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: Uuid,
    pub portfolio_id: String,
    pub description: String,
    /// Partial repository-summary text, set when the repo branch completes
    pub repo_summary: Option<String>,
    /// Partial document-summary text, set when the document branch completes
    pub doc_summary: Option<String>,
    /// Final synthesized narrative
    pub final_summary: Option<String>,
    pub status: SummaryStatus,
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency version counter
    pub version: u64,
}

impl SummaryRecord {
    /// Creates a fresh record in the optimistic initial state
    pub fn new(portfolio_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            portfolio_id: portfolio_id.into(),
            description: description.into(),
            repo_summary: None,
            doc_summary: None,
            final_summary: None,
            status: SummaryStatus::RepoInProcessing,
            created_at: Utc::now(),
            version: 0,
        }
    }
}

/// Persisted feedback for one (portfolio, note) request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub portfolio_id: String,
    pub note_id: i64,
    /// Generated feedback text; stays `None` until completion, and forever on
    /// failure
    pub text: Option<String>,
    pub status: FeedbackStatus,
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency version counter
    pub version: u64,
}

impl FeedbackRecord {
    /// Creates a fresh record awaiting asynchronous completion
    pub fn new(portfolio_id: impl Into<String>, note_id: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            portfolio_id: portfolio_id.into(),
            note_id,
            text: None,
            status: FeedbackStatus::InProcessing,
            created_at: Utc::now(),
            version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_summary_state() {
        let record = SummaryRecord::new("pf-1", "a project");
        assert_eq!(record.status, SummaryStatus::RepoInProcessing);
        assert_eq!(record.version, 0);
        assert!(record.repo_summary.is_none());
        assert!(record.final_summary.is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(SummaryStatus::NotStarted.is_terminal());
        assert!(SummaryStatus::Completed.is_terminal());
        assert!(SummaryStatus::Failed.is_terminal());
        assert!(!SummaryStatus::RepoInProcessing.is_terminal());
        assert!(!SummaryStatus::DocInProcessing.is_terminal());
        assert!(!SummaryStatus::Combining.is_terminal());
    }

    #[test]
    fn test_advance_never_rewinds() {
        let mut status = SummaryStatus::Combining;
        status.advance(SummaryStatus::DocInProcessing);
        assert_eq!(status, SummaryStatus::Combining);
        status.advance(SummaryStatus::Completed);
        assert_eq!(status, SummaryStatus::Completed);
        status.advance(SummaryStatus::RepoInProcessing);
        assert_eq!(status, SummaryStatus::Completed);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&SummaryStatus::RepoInProcessing).unwrap();
        assert_eq!(json, "\"REPO_IN_PROCESSING\"");
        let json = serde_json::to_string(&FeedbackStatus::InProcessing).unwrap();
        assert_eq!(json, "\"IN_PROCESSING\"");
    }

    #[test]
    fn test_feedback_record_starts_without_text() {
        let record = FeedbackRecord::new("pf-1", 42);
        assert_eq!(record.status, FeedbackStatus::InProcessing);
        assert_eq!(record.note_id, 42);
        assert!(record.text.is_none());
    }
}
