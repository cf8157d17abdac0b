//! In-memory request store.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{RequestRecord, RequestStore, TransitionWrite};
use crate::core::{RequestId, StageId};
use crate::errors::StoreError;
use crate::utils::Timestamp;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<RequestId, RequestRecord>,
    history: Vec<TransitionWrite>,
}

/// Request store kept in process memory.
///
/// The stage check and the write happen under one lock, so two actors that
/// loaded the same stage cannot both advance the request.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRequestStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryRequestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request in `stage`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the id is taken.
    pub fn create(
        &self,
        request_id: RequestId,
        stage: StageId,
        created_at: Timestamp,
    ) -> Result<RequestRecord, StoreError> {
        let mut inner = self.inner.lock();
        if inner.records.contains_key(&request_id) {
            return Err(StoreError::AlreadyExists(request_id));
        }
        let record = RequestRecord::new(request_id, stage, created_at);
        inner.records.insert(request_id, record.clone());
        Ok(record)
    }

    /// Returns a copy of a record.
    #[must_use]
    pub fn get(&self, request_id: RequestId) -> Option<RequestRecord> {
        self.inner.lock().records.get(&request_id).cloned()
    }

    /// Writes that were applied to a request, oldest first.
    #[must_use]
    pub fn history(&self, request_id: RequestId) -> Vec<TransitionWrite> {
        self.inner
            .lock()
            .history
            .iter()
            .filter(|w| w.request_id == request_id)
            .cloned()
            .collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn load_stage(&self, request_id: RequestId) -> Result<StageId, StoreError> {
        self.inner
            .lock()
            .records
            .get(&request_id)
            .map(|r| r.current_stage)
            .ok_or(StoreError::NotFound(request_id))
    }

    async fn save_transition(&self, write: TransitionWrite) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let record = inner
            .records
            .get_mut(&write.request_id)
            .ok_or(StoreError::NotFound(write.request_id))?;

        if record.current_stage != write.expected_stage {
            return Err(StoreError::StageMismatch {
                request_id: write.request_id,
                expected: write.expected_stage,
                actual: record.current_stage,
            });
        }

        record.apply(&write);
        inner.history.push(write);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Actor;
    use crate::engine::StageMutation;
    use crate::utils::from_unix_seconds;

    fn write(expected: u32, to: u32, note: Option<&str>) -> TransitionWrite {
        TransitionWrite {
            request_id: RequestId(1),
            expected_stage: StageId(expected),
            mutation: StageMutation {
                to_stage: StageId(to),
                rejection_note: note.map(str::to_string),
                approved: false,
            },
            actor: Actor::new("reviewer"),
            timestamp: from_unix_seconds(1_700_000_100).unwrap(),
        }
    }

    fn store() -> InMemoryRequestStore {
        let store = InMemoryRequestStore::new();
        store
            .create(RequestId(1), StageId(16), from_unix_seconds(1_700_000_000).unwrap())
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_load_and_save() {
        let store = store();
        assert_eq!(store.load_stage(RequestId(1)).await.unwrap(), StageId(16));

        store.save_transition(write(16, 17, None)).await.unwrap();

        let record = store.get(RequestId(1)).unwrap();
        assert_eq!(record.current_stage, StageId(17));
        assert_eq!(record.version, 1);
        assert_eq!(record.modified_by, Some(Actor::new("reviewer")));
        assert_eq!(store.history(RequestId(1)).len(), 1);
    }

    #[tokio::test]
    async fn test_missing_request() {
        let store = InMemoryRequestStore::new();
        assert_eq!(
            store.load_stage(RequestId(9)).await,
            Err(StoreError::NotFound(RequestId(9)))
        );
        assert_eq!(
            store.save_transition(write(16, 17, None)).await,
            Err(StoreError::NotFound(RequestId(1)))
        );
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        let store = store();
        store.save_transition(write(16, 17, None)).await.unwrap();

        let err = store.save_transition(write(16, 17, None)).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::StageMismatch {
                request_id: RequestId(1),
                expected: StageId(16),
                actual: StageId(17),
            }
        );
        assert_eq!(store.get(RequestId(1)).unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_note_set_then_cleared() {
        let store = store();
        store.save_transition(write(16, 17, None)).await.unwrap();
        store.save_transition(write(17, 16, Some("missing info"))).await.unwrap();
        assert_eq!(
            store.get(RequestId(1)).unwrap().rejection_note.as_deref(),
            Some("missing info")
        );

        store.save_transition(write(16, 17, None)).await.unwrap();
        assert!(store.get(RequestId(1)).unwrap().rejection_note.is_none());
    }

    #[test]
    fn test_create_duplicate() {
        let store = store();
        let err = store
            .create(RequestId(1), StageId(16), from_unix_seconds(0).unwrap())
            .unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists(RequestId(1)));
        assert_eq!(store.len(), 1);
    }
}
