//! Service-level error taxonomy
//!
//! Errors that cross module boundaries. Collaborator-local failures (a single
//! crawler sub-analysis, one document in a batch) are absorbed into fallback
//! values close to where they happen and never show up here.

use crate::llm::GenerationError;
use crate::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the summary and feedback services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No progress record exists for the portfolio
    #[error("no summary found for portfolio {0}")]
    SummaryNotFound(String),

    /// A progress record exists but has not reached COMPLETED
    #[error("summary for portfolio {0} is not completed")]
    SummaryNotCompleted(String),

    /// No feedback record matches the requested identifier
    #[error("no feedback found for {0}")]
    FeedbackNotFound(String),

    /// Repository URL did not yield an owner and a name
    #[error("invalid repository reference: {0}")]
    InvalidRepositoryReference(String),

    /// A collaborator call failed in a context where it cannot be absorbed
    #[error("external call failed: {0}")]
    ExternalCallFailure(String),

    /// Optimistic version check kept failing after the retry budget
    #[error("version conflict on record {id} persisted after {attempts} attempts")]
    ConcurrencyConflict { id: Uuid, attempts: u32 },

    /// Record store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Text generation failed in a terminal position (aggregation, feedback)
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}
