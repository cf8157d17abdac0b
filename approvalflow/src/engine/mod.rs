//! The workflow engine.
//!
//! This module provides:
//! - The pure transition decision (`attempt_transition`)
//! - Resolved transitions and the record mutation they imply
//! - `WorkflowService`, which runs load, decide and compare-and-swap save

mod attempt;
mod service;
mod transition;

pub use attempt::{attempt_transition, available_actions};
pub use service::{AppliedTransition, WorkflowService};
pub use transition::{ResolvedTransition, StageMutation};
