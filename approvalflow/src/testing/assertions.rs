//! Test assertions for action results.

use crate::core::StageId;
use crate::engine::AppliedTransition;
use crate::errors::WorkflowError;
use crate::store::RequestRecord;

/// Asserts that the action was applied and landed in `stage`.
pub fn assert_applied_to(result: &Result<AppliedTransition, WorkflowError>, stage: StageId) {
    match result {
        Ok(applied) => assert_eq!(
            applied.to_stage, stage,
            "Expected transition to stage {stage}, got {}",
            applied.to_stage
        ),
        Err(err) => panic!("Expected transition to stage {stage}, got error: {err}"),
    }
}

/// Asserts that the action was refused with the error `code`.
pub fn assert_refused_with<T: std::fmt::Debug>(result: &Result<T, WorkflowError>, code: &str) {
    match result {
        Ok(value) => panic!("Expected refusal '{code}', got success: {value:?}"),
        Err(err) => assert_eq!(
            err.code(),
            code,
            "Expected refusal '{code}', got '{}': {err}",
            err.code()
        ),
    }
}

/// Asserts a record's stage and stored rejection note.
pub fn assert_record_in(record: &RequestRecord, stage: StageId, note: Option<&str>) {
    assert_eq!(
        record.current_stage, stage,
        "Expected request {} in stage {stage}, found {}",
        record.id, record.current_stage
    );
    assert_eq!(
        record.rejection_note.as_deref(),
        note,
        "Unexpected rejection note on request {}",
        record.id
    );
}
