//! Workflow definitions.
//!
//! This module provides:
//! - The immutable stage graph and its queries
//! - A validating builder
//! - Serializable workflow tables
//! - The built-in catalogue and a registry keyed by kind

mod builder;
pub mod catalog;
mod config;
mod registry;
mod workflow;

pub use builder::{WorkflowBuilder, CAPABILITY_PATTERN};
pub use config::{StageConfig, TransitionConfig, WorkflowConfig};
pub use registry::WorkflowRegistry;
pub use workflow::{TerminalPolicy, Transition, WorkflowDefinition};
