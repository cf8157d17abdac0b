//! Request persistence.
//!
//! The engine never owns request records. Each plugin table sits behind a
//! [`RequestStore`] that can read the current stage and write a transition
//! with compare-and-swap on that stage.

mod memory;

pub use memory::InMemoryRequestStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{Actor, RequestId, StageId};
use crate::engine::StageMutation;
use crate::errors::StoreError;
use crate::utils::Timestamp;

/// A request record as the in-memory store keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Record id.
    pub id: RequestId,
    /// Current stage.
    pub current_stage: StageId,
    /// Note of the last rejection, cleared on approval.
    pub rejection_note: Option<String>,
    /// Convenience flag mirroring "current stage is the approved terminal".
    pub approved: bool,
    /// Creation time.
    pub created_at: Timestamp,
    /// Time of the last transition.
    pub modified_at: Option<Timestamp>,
    /// Actor of the last transition.
    pub modified_by: Option<Actor>,
    /// Incremented on every write.
    pub version: u64,
}

impl RequestRecord {
    /// Creates a fresh record in `stage`.
    #[must_use]
    pub fn new(id: RequestId, stage: StageId, created_at: Timestamp) -> Self {
        Self {
            id,
            current_stage: stage,
            rejection_note: None,
            approved: false,
            created_at,
            modified_at: None,
            modified_by: None,
            version: 0,
        }
    }

    /// Applies a write to this record.
    pub fn apply(&mut self, write: &TransitionWrite) {
        self.current_stage = write.mutation.to_stage;
        self.rejection_note.clone_from(&write.mutation.rejection_note);
        self.approved = write.mutation.approved;
        self.modified_at = Some(write.timestamp);
        self.modified_by = Some(write.actor.clone());
        self.version += 1;
    }
}

/// One transition to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionWrite {
    /// The request.
    pub request_id: RequestId,
    /// Stage returned by `load_stage`; the write fails if it changed.
    pub expected_stage: StageId,
    /// Record changes.
    pub mutation: StageMutation,
    /// Acting user, stored as `modified_by`.
    pub actor: Actor,
    /// Stored as `modified_at`.
    pub timestamp: Timestamp,
}

/// Persistence adapter for one request table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Reads the current stage.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record does not exist.
    async fn load_stage(&self, request_id: RequestId) -> Result<StageId, StoreError>;

    /// Writes a transition if the stored stage still equals
    /// `write.expected_stage`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StageMismatch` if the stage changed since it was
    /// loaded, or `StoreError::NotFound` if the record vanished.
    async fn save_transition(&self, write: TransitionWrite) -> Result<(), StoreError>;
}
