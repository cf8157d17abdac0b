//! Test harness wiring a workflow to in-memory collaborators.

use std::sync::Arc;

use crate::core::{Action, Actor, Capability, RequestId, StageId};
use crate::definition::{catalog, WorkflowDefinition};
use crate::engine::{AppliedTransition, WorkflowService};
use crate::errors::{DefinitionError, StoreError, WorkflowError};
use crate::events::CollectingEventSink;
use crate::permissions::StaticPermissionOracle;
use crate::store::{InMemoryRequestStore, RequestRecord};
use crate::utils::{Clock, FixedClock, Timestamp};

/// A workflow service over an in-memory store, a static grant table,
/// a frozen clock and a collecting event sink.
#[derive(Debug)]
pub struct TestHarness {
    /// The request store.
    pub store: InMemoryRequestStore,
    /// Grant table, wrapped so queries can be counted.
    pub oracle: Arc<super::RecordingPermissionOracle<StaticPermissionOracle>>,
    /// Clock used for creation and modification times.
    pub clock: Arc<FixedClock>,
    /// Events emitted by the service.
    pub events: Arc<CollectingEventSink>,
    /// The service under test.
    pub service: WorkflowService,
}

impl TestHarness {
    /// Wires `workflow` to fresh collaborators.
    #[must_use]
    pub fn new(workflow: WorkflowDefinition) -> Self {
        let store = InMemoryRequestStore::new();
        let oracle = Arc::new(super::RecordingPermissionOracle::new(
            StaticPermissionOracle::new(),
        ));
        let clock = Arc::new(FixedClock::new(Timestamp::default()));
        let events = Arc::new(CollectingEventSink::new());
        let service = WorkflowService::new(
            Arc::new(workflow),
            Arc::new(store.clone()),
            oracle.clone(),
        )
        .with_clock(clock.clone())
        .with_event_sink(events.clone());

        Self {
            store,
            oracle,
            clock,
            events,
            service,
        }
    }

    /// Harness for the built-in room booking workflow.
    ///
    /// # Errors
    ///
    /// Returns the definition error if the built-in table is invalid.
    pub fn room_booking() -> Result<Self, DefinitionError> {
        catalog::room_booking().build().map(Self::new)
    }

    /// The workflow under test.
    #[must_use]
    pub fn workflow(&self) -> &WorkflowDefinition {
        self.service.workflow()
    }

    /// Creates a request in the initial stage.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the id is taken.
    pub fn create_request(&self, id: u64) -> Result<RequestRecord, StoreError> {
        self.create_request_at(id, self.workflow().initial_stage())
    }

    /// Creates a request in `stage`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the id is taken.
    pub fn create_request_at(&self, id: u64, stage: StageId) -> Result<RequestRecord, StoreError> {
        self.store.create(RequestId(id), stage, self.clock.now())
    }

    /// Grants one capability.
    pub fn grant(&self, actor: &str, capability: &str) {
        self.oracle.inner().grant(actor, capability);
    }

    /// Grants every capability the workflow uses.
    pub fn grant_all(&self, actor: &str) {
        let capabilities: Vec<Capability> = self
            .workflow()
            .transitions()
            .into_iter()
            .filter_map(|t| t.required_capability.clone())
            .collect();
        for capability in capabilities {
            self.oracle.inner().grant(actor, capability);
        }
    }

    /// Current copy of a record.
    #[must_use]
    pub fn record(&self, id: u64) -> Option<RequestRecord> {
        self.store.get(RequestId(id))
    }

    /// Approves as `actor`.
    ///
    /// # Errors
    ///
    /// Returns the service's refusal.
    pub async fn approve(&self, id: u64, actor: &str) -> Result<AppliedTransition, WorkflowError> {
        self.service
            .apply(RequestId(id), Action::Approve, &Actor::new(actor), None)
            .await
    }

    /// Rejects as `actor` with `note`.
    ///
    /// # Errors
    ///
    /// Returns the service's refusal.
    pub async fn reject(
        &self,
        id: u64,
        actor: &str,
        note: Option<&str>,
    ) -> Result<AppliedTransition, WorkflowError> {
        self.service
            .apply(RequestId(id), Action::Reject, &Actor::new(actor), note)
            .await
    }
}
