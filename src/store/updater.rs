//! Optimistic-concurrency retrying updater
//!
//! The single mutation path for stored records. Every update is a
//! read-modify-write conditioned on the version being unchanged; a conflict
//! means another writer committed in between, so the updater reloads and
//! reapplies the mutation, up to a fixed budget. The wait between attempts is
//! a non-blocking `tokio` sleep, never an occupied thread.

use super::record::{FeedbackRecord, SummaryRecord};
use super::{RecordStore, StoreError};
use crate::error::ServiceError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(100);

/// Serializes record mutations through version-checked retries
#[derive(Clone)]
pub struct RetryingUpdater {
    store: Arc<dyn RecordStore>,
}

impl RetryingUpdater {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Applies `mutate` to the summary record and writes it back
    ///
    /// Retries up to 3 times with a delay of 100ms × attempt number between
    /// conflicting attempts. After the budget is exhausted the conflict is
    /// surfaced as [`ServiceError::ConcurrencyConflict`]; the stored record may
    /// then be stale, which callers must treat as fatal for the run.
    pub async fn update_summary<F>(&self, id: Uuid, mutate: F) -> Result<SummaryRecord, ServiceError>
    where
        F: Fn(&mut SummaryRecord) + Send + Sync,
    {
        for attempt in 1..=MAX_ATTEMPTS {
            let mut record = self
                .store
                .find_summary(id)
                .await?
                .ok_or(StoreError::NotFound(id))?;
            mutate(&mut record);

            match self.store.update_summary(record.clone()).await {
                Ok(()) => {
                    // update_summary bumped the stored version
                    record.version += 1;
                    return Ok(record);
                }
                Err(StoreError::VersionConflict { stored, .. }) => {
                    if attempt == MAX_ATTEMPTS {
                        warn!(
                            record_id = %id,
                            attempts = MAX_ATTEMPTS,
                            "summary update conflict budget exhausted"
                        );
                        return Err(ServiceError::ConcurrencyConflict {
                            id,
                            attempts: MAX_ATTEMPTS,
                        });
                    }
                    debug!(
                        record_id = %id,
                        attempt,
                        stored_version = stored,
                        "summary update conflicted, retrying"
                    );
                    tokio::time::sleep(BASE_DELAY * attempt).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        unreachable!("retry loop always returns within the attempt budget")
    }

    /// Feedback-record counterpart of [`Self::update_summary`]
    pub async fn update_feedback<F>(
        &self,
        id: Uuid,
        mutate: F,
    ) -> Result<FeedbackRecord, ServiceError>
    where
        F: Fn(&mut FeedbackRecord) + Send + Sync,
    {
        for attempt in 1..=MAX_ATTEMPTS {
            let mut record = self
                .store
                .find_feedback(id)
                .await?
                .ok_or(StoreError::NotFound(id))?;
            mutate(&mut record);

            match self.store.update_feedback(record.clone()).await {
                Ok(()) => {
                    record.version += 1;
                    return Ok(record);
                }
                Err(StoreError::VersionConflict { stored, .. }) => {
                    if attempt == MAX_ATTEMPTS {
                        warn!(
                            record_id = %id,
                            attempts = MAX_ATTEMPTS,
                            "feedback update conflict budget exhausted"
                        );
                        return Err(ServiceError::ConcurrencyConflict {
                            id,
                            attempts: MAX_ATTEMPTS,
                        });
                    }
                    debug!(record_id = %id, attempt, stored_version = stored, "feedback update conflicted, retrying");
                    tokio::time::sleep(BASE_DELAY * attempt).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        unreachable!("retry loop always returns within the attempt budget")
    }
}

#[cfg(test)]
mod tests {
    use super::super::record::SummaryStatus;
    use super::super::MemoryStore;
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store that reports a version conflict for the first `conflicts` update
    /// calls, then delegates to an inner `MemoryStore`.
    struct ConflictingStore {
        inner: MemoryStore,
        conflicts: u32,
        update_calls: AtomicU32,
    }

    impl ConflictingStore {
        fn new(conflicts: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                conflicts,
                update_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordStore for ConflictingStore {
        async fn insert_summary(&self, record: SummaryRecord) -> Result<(), StoreError> {
            self.inner.insert_summary(record).await
        }

        async fn find_summary(&self, id: Uuid) -> Result<Option<SummaryRecord>, StoreError> {
            self.inner.find_summary(id).await
        }

        async fn find_summary_by_portfolio(
            &self,
            portfolio_id: &str,
        ) -> Result<Option<SummaryRecord>, StoreError> {
            self.inner.find_summary_by_portfolio(portfolio_id).await
        }

        async fn update_summary(&self, record: SummaryRecord) -> Result<(), StoreError> {
            let call = self.update_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.conflicts {
                return Err(StoreError::VersionConflict {
                    id: record.id,
                    supplied: record.version,
                    stored: record.version + 1,
                });
            }
            self.inner.update_summary(record).await
        }

        async fn insert_feedback(&self, record: FeedbackRecord) -> Result<(), StoreError> {
            self.inner.insert_feedback(record).await
        }

        async fn find_feedback(&self, id: Uuid) -> Result<Option<FeedbackRecord>, StoreError> {
            self.inner.find_feedback(id).await
        }

        async fn find_feedback_by_portfolio(
            &self,
            portfolio_id: &str,
        ) -> Result<Vec<FeedbackRecord>, StoreError> {
            self.inner.find_feedback_by_portfolio(portfolio_id).await
        }

        async fn find_latest_feedback(
            &self,
            portfolio_id: &str,
        ) -> Result<Option<FeedbackRecord>, StoreError> {
            self.inner.find_latest_feedback(portfolio_id).await
        }

        async fn find_latest_feedback_for_note(
            &self,
            portfolio_id: &str,
            note_id: i64,
        ) -> Result<Option<FeedbackRecord>, StoreError> {
            self.inner
                .find_latest_feedback_for_note(portfolio_id, note_id)
                .await
        }

        async fn update_feedback(&self, record: FeedbackRecord) -> Result<(), StoreError> {
            let call = self.update_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.conflicts {
                return Err(StoreError::VersionConflict {
                    id: record.id,
                    supplied: record.version,
                    stored: record.version + 1,
                });
            }
            self.inner.update_feedback(record).await
        }
    }

    #[tokio::test]
    async fn test_update_without_conflict() {
        let store = Arc::new(MemoryStore::new());
        let updater = RetryingUpdater::new(store.clone());
        let record = SummaryRecord::new("pf-1", "desc");
        let id = record.id;
        store.insert_summary(record).await.unwrap();

        let start = std::time::Instant::now();
        let updated = updater
            .update_summary(id, |r| r.status = SummaryStatus::DocInProcessing)
            .await
            .unwrap();
        // first-attempt success must not sleep
        assert!(start.elapsed() < Duration::from_millis(90));
        assert_eq!(updated.status, SummaryStatus::DocInProcessing);
        assert_eq!(updated.version, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_conflict_then_success() {
        let store = Arc::new(ConflictingStore::new(1));
        let updater = RetryingUpdater::new(store.clone());
        let record = SummaryRecord::new("pf-1", "desc");
        let id = record.id;
        store.insert_summary(record).await.unwrap();

        let updated = updater
            .update_summary(id, |r| r.status = SummaryStatus::Combining)
            .await
            .unwrap();
        assert_eq!(updated.status, SummaryStatus::Combining);
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_conflict_budget_exhausted() {
        let store = Arc::new(ConflictingStore::new(u32::MAX));
        let updater = RetryingUpdater::new(store.clone());
        let record = SummaryRecord::new("pf-1", "desc");
        let id = record.id;
        store.insert_summary(record).await.unwrap();

        let err = updater
            .update_summary(id, |r| r.status = SummaryStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::ConcurrencyConflict { attempts: 3, .. }
        ));
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 3);

        // record is left stale
        let stored = store.find_summary(id).await.unwrap().unwrap();
        assert_eq!(stored.status, SummaryStatus::RepoInProcessing);
    }

    #[tokio::test]
    async fn test_missing_record() {
        let updater = RetryingUpdater::new(Arc::new(MemoryStore::new()));
        let err = updater
            .update_summary(Uuid::new_v4(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_updaters_both_commit() {
        let store = Arc::new(MemoryStore::new());
        let record = SummaryRecord::new("pf-1", "desc");
        let id = record.id;
        store.insert_summary(record).await.unwrap();

        let a = {
            let updater = RetryingUpdater::new(store.clone());
            tokio::spawn(async move {
                updater
                    .update_summary(id, |r| r.repo_summary = Some("repo".to_string()))
                    .await
            })
        };
        let b = {
            let updater = RetryingUpdater::new(store.clone());
            tokio::spawn(async move {
                updater
                    .update_summary(id, |r| r.doc_summary = Some("doc".to_string()))
                    .await
            })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // exactly one commit per version: two commits, version 2, both applied
        let stored = store.find_summary(id).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.repo_summary.as_deref(), Some("repo"));
        assert_eq!(stored.doc_summary.as_deref(), Some("doc"));
    }
}
