//! Core value types for approval workflows.
//!
//! This module contains the types shared by workflow definitions, the
//! engine, and the collaborator traits:
//! - Stage ids, roles and descriptors
//! - Approve/reject actions
//! - Request, actor and capability identities

mod action;
mod identity;
mod stage;

pub use action::{Action, ParseActionError};
pub use identity::{Actor, Capability, RequestId};
pub use stage::{Stage, StageId, StageRole};
