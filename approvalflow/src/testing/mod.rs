//! Testing utilities for approval workflows.
//!
//! This module provides:
//! - A permission oracle that records every query
//! - A harness wiring a workflow to in-memory collaborators
//! - Assertions over action results and records

mod assertions;
mod harness;
mod oracles;

pub use assertions::{assert_applied_to, assert_record_in, assert_refused_with};
pub use harness::TestHarness;
pub use oracles::RecordingPermissionOracle;
