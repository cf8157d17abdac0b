//! # Approvalflow
//!
//! Multi-stage approval workflows for institutional requests.
//!
//! A request moves through an ordered chain of review stages. Each stage
//! accepts two actions, approve and reject, and each action is gated by a
//! capability the acting user must hold. Workflows are tables:
//!
//! - **Definitions**: stages and transitions validated once at start-up
//! - **Engine**: a pure decision function plus a service that persists it
//! - **Stores and oracles**: narrow traits for request records and permissions
//! - **Events**: structured payloads for every applied or refused action
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use approvalflow::prelude::*;
//! use chrono::Utc;
//! use std::sync::Arc;
//!
//! let workflow = Arc::new(catalog::room_booking().build()?);
//! let store = InMemoryRequestStore::new();
//! store.create(RequestId(1), workflow.initial_stage(), Utc::now())?;
//!
//! let oracle = StaticPermissionOracle::new().with_grant("alice", "local/roombooking:step1");
//! let service = WorkflowService::new(workflow, Arc::new(store), Arc::new(oracle));
//!
//! let applied = service
//!     .apply(RequestId(1), Action::Approve, &Actor::new("alice"), None)
//!     .await?;
//! assert_eq!(applied.to_stage, StageId(17));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod api;
pub mod core;
pub mod definition;
pub mod engine;
pub mod errors;
pub mod events;
pub mod observability;
pub mod permissions;
pub mod store;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::{handle_action, ActionRequest, ActionResponse, StatusMode};
    pub use crate::core::{Action, Actor, Capability, RequestId, Stage, StageId, StageRole};
    pub use crate::definition::{
        catalog, TerminalPolicy, Transition, WorkflowBuilder, WorkflowConfig,
        WorkflowDefinition, WorkflowRegistry,
    };
    pub use crate::engine::{attempt_transition, AppliedTransition, WorkflowService};
    pub use crate::errors::{DefinitionError, StoreError, WorkflowError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink, WorkflowEvent};
    pub use crate::permissions::{PermissionOracle, StaticPermissionOracle};
    pub use crate::store::{InMemoryRequestStore, RequestRecord, RequestStore};
    pub use crate::utils::{Clock, SystemClock, Timestamp};
}
