//! In-memory record store
//!
//! Reference implementation of [`RecordStore`] backed by `tokio::sync::RwLock`
//! maps. The version check happens under the write lock, so concurrent writers
//! observe the same accept-or-conflict behavior a database with optimistic
//! locking would give them.

use super::record::{FeedbackRecord, SummaryRecord};
use super::{RecordStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory `RecordStore` implementation
#[derive(Default)]
pub struct MemoryStore {
    summaries: RwLock<HashMap<Uuid, SummaryRecord>>,
    feedbacks: RwLock<HashMap<Uuid, FeedbackRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_summary(&self, record: SummaryRecord) -> Result<(), StoreError> {
        self.summaries.write().await.insert(record.id, record);
        Ok(())
    }

    async fn find_summary(&self, id: Uuid) -> Result<Option<SummaryRecord>, StoreError> {
        Ok(self.summaries.read().await.get(&id).cloned())
    }

    async fn find_summary_by_portfolio(
        &self,
        portfolio_id: &str,
    ) -> Result<Option<SummaryRecord>, StoreError> {
        Ok(self
            .summaries
            .read()
            .await
            .values()
            .filter(|r| r.portfolio_id == portfolio_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn update_summary(&self, mut record: SummaryRecord) -> Result<(), StoreError> {
        let mut summaries = self.summaries.write().await;
        let stored = summaries
            .get(&record.id)
            .ok_or(StoreError::NotFound(record.id))?;
        if stored.version != record.version {
            return Err(StoreError::VersionConflict {
                id: record.id,
                supplied: record.version,
                stored: stored.version,
            });
        }
        record.version += 1;
        summaries.insert(record.id, record);
        Ok(())
    }

    async fn insert_feedback(&self, record: FeedbackRecord) -> Result<(), StoreError> {
        self.feedbacks.write().await.insert(record.id, record);
        Ok(())
    }

    async fn find_feedback(&self, id: Uuid) -> Result<Option<FeedbackRecord>, StoreError> {
        Ok(self.feedbacks.read().await.get(&id).cloned())
    }

    async fn find_feedback_by_portfolio(
        &self,
        portfolio_id: &str,
    ) -> Result<Vec<FeedbackRecord>, StoreError> {
        let mut records: Vec<FeedbackRecord> = self
            .feedbacks
            .read()
            .await
            .values()
            .filter(|r| r.portfolio_id == portfolio_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn find_latest_feedback(
        &self,
        portfolio_id: &str,
    ) -> Result<Option<FeedbackRecord>, StoreError> {
        Ok(self
            .feedbacks
            .read()
            .await
            .values()
            .filter(|r| r.portfolio_id == portfolio_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn find_latest_feedback_for_note(
        &self,
        portfolio_id: &str,
        note_id: i64,
    ) -> Result<Option<FeedbackRecord>, StoreError> {
        Ok(self
            .feedbacks
            .read()
            .await
            .values()
            .filter(|r| r.portfolio_id == portfolio_id && r.note_id == note_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn update_feedback(&self, mut record: FeedbackRecord) -> Result<(), StoreError> {
        let mut feedbacks = self.feedbacks.write().await;
        let stored = feedbacks
            .get(&record.id)
            .ok_or(StoreError::NotFound(record.id))?;
        if stored.version != record.version {
            return Err(StoreError::VersionConflict {
                id: record.id,
                supplied: record.version,
                stored: stored.version,
            });
        }
        record.version += 1;
        feedbacks.insert(record.id, record);
        Ok(())
    }
}
