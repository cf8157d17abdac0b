//! The pure transition decision.

use super::ResolvedTransition;
use crate::core::{Action, Actor, StageId};
use crate::definition::WorkflowDefinition;
use crate::errors::WorkflowError;
use crate::permissions::PermissionOracle;

/// Validates one approve/reject action and resolves its transition.
///
/// Checks run in a fixed order:
/// 1. A reject with an empty or blank note fails with
///    [`WorkflowError::MissingRejectionReason`] before anything else.
/// 2. A missing edge fails with [`WorkflowError::NoSuchTransition`].
/// 3. An actor the oracle refuses fails with
///    [`WorkflowError::PermissionDenied`]. An edge without a capability
///    is refused for everyone.
///
/// The note is ignored for approvals. Nothing is persisted here.
///
/// # Errors
///
/// Returns the first failed check as described above.
pub fn attempt_transition<O>(
    workflow: &WorkflowDefinition,
    current_stage: StageId,
    action: Action,
    actor: &Actor,
    note: Option<&str>,
    oracle: &O,
) -> Result<ResolvedTransition, WorkflowError>
where
    O: PermissionOracle + ?Sized,
{
    let rejection_note = match action {
        Action::Approve => None,
        Action::Reject => match note.map(str::trim) {
            Some(note) if !note.is_empty() => Some(note.to_string()),
            _ => return Err(WorkflowError::MissingRejectionReason),
        },
    };

    let edge = workflow
        .transition(current_stage, action)
        .ok_or(WorkflowError::no_such_transition(current_stage, action))?;

    let capability = match &edge.required_capability {
        Some(cap) if oracle.has_capability(cap, actor) => cap.clone(),
        other => {
            return Err(WorkflowError::permission_denied(
                current_stage,
                action,
                other.clone(),
            ))
        }
    };

    Ok(ResolvedTransition {
        from: current_stage,
        to: edge.to,
        action,
        capability,
        rejection_note,
        reaches_approved: workflow.is_approved_terminal(edge.to),
    })
}

/// Actions `actor` could take from `stage`, approve first.
#[must_use]
pub fn available_actions<O>(
    workflow: &WorkflowDefinition,
    stage: StageId,
    actor: &Actor,
    oracle: &O,
) -> Vec<Action>
where
    O: PermissionOracle + ?Sized,
{
    Action::ALL
        .into_iter()
        .filter(|action| {
            workflow
                .transition(stage, *action)
                .is_some_and(|t| oracle.permits(t.required_capability.as_ref(), actor))
        })
        .collect()
}
