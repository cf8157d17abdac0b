//! Orchestration of one action against one stored request.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{attempt_transition, available_actions};
use crate::core::{Action, Actor, RequestId, StageId};
use crate::definition::WorkflowDefinition;
use crate::errors::WorkflowError;
use crate::events::{EventSink, NoOpEventSink, WorkflowEvent};
use crate::observability::SpanTimer;
use crate::permissions::PermissionOracle;
use crate::store::{RequestStore, TransitionWrite};
use crate::utils::{Clock, SystemClock, Timestamp};

/// A transition that was validated and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTransition {
    /// The request.
    pub request_id: RequestId,
    /// Stage before the action.
    pub from_stage: StageId,
    /// Stage after the action.
    pub to_stage: StageId,
    /// The action taken.
    pub action: Action,
    /// Who took it.
    pub actor: Actor,
    /// Stored rejection note; `None` after an approval.
    pub rejection_note: Option<String>,
    /// Modification time written to the record.
    pub applied_at: Timestamp,
}

/// Runs approve/reject actions for one workflow kind.
///
/// Each call loads the stage, asks the engine for a decision, and writes
/// the result with the loaded stage as the expected prior stage.
#[derive(Clone)]
pub struct WorkflowService {
    workflow: Arc<WorkflowDefinition>,
    store: Arc<dyn RequestStore>,
    oracle: Arc<dyn PermissionOracle>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for WorkflowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowService")
            .field("workflow", &self.workflow.kind())
            .finish_non_exhaustive()
    }
}

impl WorkflowService {
    /// Creates a service using the wall clock and no event sink.
    #[must_use]
    pub fn new(
        workflow: Arc<WorkflowDefinition>,
        store: Arc<dyn RequestStore>,
        oracle: Arc<dyn PermissionOracle>,
    ) -> Self {
        Self {
            workflow,
            store,
            oracle,
            clock: Arc::new(SystemClock),
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the clock used for `modified_at`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// The workflow this service drives.
    #[must_use]
    pub fn workflow(&self) -> &WorkflowDefinition {
        &self.workflow
    }

    /// Applies one action to a stored request.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` and `ConcurrentModification` from the store,
    /// any engine refusal, or `Storage` for backend failures.
    pub async fn apply(
        &self,
        request_id: RequestId,
        action: Action,
        actor: &Actor,
        note: Option<&str>,
    ) -> Result<AppliedTransition, WorkflowError> {
        let timer = SpanTimer::start("workflow.apply");
        let result = self.apply_inner(request_id, action, actor, note).await;
        let duration_ms = timer.finish();
        let workflow = self.workflow.kind();

        match &result {
            Ok(applied) => {
                info!(
                    workflow,
                    %request_id,
                    %action,
                    %actor,
                    from_stage = %applied.from_stage,
                    to_stage = %applied.to_stage,
                    duration_ms,
                    "Transition applied"
                );
                self.events.try_emit(WorkflowEvent::applied(workflow, applied));
            }
            Err(err) => {
                if matches!(err, WorkflowError::Storage { .. }) {
                    error!(workflow, %request_id, %action, %actor, error = %err, fatal = err.is_fatal(), "Transition failed");
                } else {
                    warn!(workflow, %request_id, %action, %actor, code = err.code(), error = %err, "Transition refused");
                }
                self.events
                    .try_emit(WorkflowEvent::refused(workflow, request_id, action, actor, err));
            }
        }

        result
    }

    async fn apply_inner(
        &self,
        request_id: RequestId,
        action: Action,
        actor: &Actor,
        note: Option<&str>,
    ) -> Result<AppliedTransition, WorkflowError> {
        let current = self.store.load_stage(request_id).await?;
        let resolved = attempt_transition(
            &self.workflow,
            current,
            action,
            actor,
            note,
            self.oracle.as_ref(),
        )?;

        let applied_at = self.clock.now();
        let mutation = resolved.mutation();
        self.store
            .save_transition(TransitionWrite {
                request_id,
                expected_stage: current,
                mutation: mutation.clone(),
                actor: actor.clone(),
                timestamp: applied_at,
            })
            .await?;

        Ok(AppliedTransition {
            request_id,
            from_stage: current,
            to_stage: mutation.to_stage,
            action,
            actor: actor.clone(),
            rejection_note: mutation.rejection_note,
            applied_at,
        })
    }

    /// Actions `actor` may currently take on a stored request.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the stage cannot be loaded.
    pub async fn available_actions(
        &self,
        request_id: RequestId,
        actor: &Actor,
    ) -> Result<Vec<Action>, WorkflowError> {
        let current = self.store.load_stage(request_id).await?;
        Ok(available_actions(
            &self.workflow,
            current,
            actor,
            self.oracle.as_ref(),
        ))
    }
}
