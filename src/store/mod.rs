//! Durable record store abstraction
//!
//! Progress and feedback records live behind the `RecordStore` trait. The
//! store enforces optimistic concurrency: every update carries the version the
//! writer read, and the store rejects it when the stored version has moved on.
//! All production-path mutation goes through the [`RetryingUpdater`], never
//! through the trait directly.

mod memory;
mod record;
mod updater;

pub use memory::MemoryStore;
pub use record::{FeedbackRecord, FeedbackStatus, SummaryRecord, SummaryStatus};
pub use updater::RetryingUpdater;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Record store failures
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No record with the given id
    #[error("record {0} not found")]
    NotFound(Uuid),

    /// The supplied version does not match the stored version
    #[error("version conflict on record {id}: supplied {supplied}, stored {stored}")]
    VersionConflict {
        id: Uuid,
        supplied: u64,
        stored: u64,
    },
}

/// Persistence collaborator for progress and feedback records
///
/// `update_*` must reject writes whose `version` does not match the currently
/// stored version, and bump the stored version on every accepted write.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_summary(&self, record: SummaryRecord) -> Result<(), StoreError>;

    async fn find_summary(&self, id: Uuid) -> Result<Option<SummaryRecord>, StoreError>;

    /// Newest summary record for the portfolio, by creation time
    async fn find_summary_by_portfolio(
        &self,
        portfolio_id: &str,
    ) -> Result<Option<SummaryRecord>, StoreError>;

    /// Version-checked write-back of a previously loaded summary record
    async fn update_summary(&self, record: SummaryRecord) -> Result<(), StoreError>;

    async fn insert_feedback(&self, record: FeedbackRecord) -> Result<(), StoreError>;

    async fn find_feedback(&self, id: Uuid) -> Result<Option<FeedbackRecord>, StoreError>;

    /// All feedback records for the portfolio, oldest first
    async fn find_feedback_by_portfolio(
        &self,
        portfolio_id: &str,
    ) -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Newest feedback record for the portfolio, regardless of note
    async fn find_latest_feedback(
        &self,
        portfolio_id: &str,
    ) -> Result<Option<FeedbackRecord>, StoreError>;

    /// Newest feedback record for the exact (portfolio, note) pair
    async fn find_latest_feedback_for_note(
        &self,
        portfolio_id: &str,
        note_id: i64,
    ) -> Result<Option<FeedbackRecord>, StoreError>;

    /// Version-checked write-back of a previously loaded feedback record
    async fn update_feedback(&self, record: FeedbackRecord) -> Result<(), StoreError>;
}
