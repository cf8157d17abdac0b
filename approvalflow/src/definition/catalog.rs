//! Built-in tables for the workflow kinds shipped with the LMS plugins.
//!
//! Every kind has the same shape: an initial review, two further reviews
//! and a final sign-off, then the approved terminal, plus a rejected
//! terminal. Stage ids are the status codes stored by each plugin.

use super::{StageConfig, WorkflowConfig, WorkflowRegistry};
use crate::core::StageRole;
use crate::errors::DefinitionError;

/// Kind key of the room booking workflow.
pub const ROOM_BOOKING: &str = "room_booking";
/// Kind key of the residence booking workflow.
pub const RESIDENCE_BOOKING: &str = "residence_booking";
/// Kind key of the computer service request workflow.
pub const COMPUTER_SERVICE: &str = "computer_service";
/// Kind key of the participant request workflow.
pub const PARTICIPANT_REQUEST: &str = "participant_request";
/// Kind key of the course request workflow.
pub const COURSE_REQUEST: &str = "course_request";

const REVIEW_LABELS: [&str; 4] = [
    "Leader 1 review",
    "Leader 2 review",
    "Leader 3 review",
    "Boss review",
];

fn four_step(kind: &str, label: &str, component: &str, first_id: u32) -> WorkflowConfig {
    let mut config = WorkflowConfig::new(kind).with_label(label);

    for (offset, review_label) in (0u32..).zip(REVIEW_LABELS) {
        let role = if offset == 0 {
            StageRole::Initial
        } else {
            StageRole::Review
        };
        config = config.with_stage(
            StageConfig::new(first_id + offset, review_label, role)
                .with_capability(format!("{component}:step{}", offset + 1)),
        );
    }

    config
        .with_stage(StageConfig::new(first_id + 4, "Approved", StageRole::Approved))
        .with_stage(StageConfig::new(first_id + 5, "Rejected", StageRole::Rejected))
}

/// Room booking: stages 16 to 19, approved 20, rejected 21.
#[must_use]
pub fn room_booking() -> WorkflowConfig {
    four_step(ROOM_BOOKING, "Room booking", "local/roombooking", 16)
}

/// Residence booking: stages 30 to 33, approved 34, rejected 35.
#[must_use]
pub fn residence_booking() -> WorkflowConfig {
    four_step(RESIDENCE_BOOKING, "Residence booking", "local/residencebooking", 30)
}

/// Computer service requests: stages 40 to 43, approved 44, rejected 45.
#[must_use]
pub fn computer_service() -> WorkflowConfig {
    four_step(COMPUTER_SERVICE, "Computer service request", "local/computerservice", 40)
}

/// Participant requests: stages 50 to 53, approved 54, rejected 55.
#[must_use]
pub fn participant_request() -> WorkflowConfig {
    four_step(PARTICIPANT_REQUEST, "Participant request", "local/participant", 50)
}

/// Course requests: stages 60 to 63, approved 64, rejected 65.
#[must_use]
pub fn course_request() -> WorkflowConfig {
    four_step(COURSE_REQUEST, "Course request", "local/courserequest", 60)
}

/// All built-in tables.
#[must_use]
pub fn all() -> Vec<WorkflowConfig> {
    vec![
        room_booking(),
        residence_booking(),
        computer_service(),
        participant_request(),
        course_request(),
    ]
}

/// Builds a registry holding every built-in workflow.
///
/// # Errors
///
/// Returns the first table that fails validation.
pub fn builtin_registry() -> Result<WorkflowRegistry, DefinitionError> {
    WorkflowRegistry::from_configs(&all())
}
