//! Engine outputs: the resolved transition and the mutation to persist.

use serde::{Deserialize, Serialize};

use crate::core::{Action, Capability, StageId};

/// A transition the engine validated for one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTransition {
    /// Stage the request was in.
    pub from: StageId,
    /// Stage the request moves to.
    pub to: StageId,
    /// The action taken.
    pub action: Action,
    /// The capability that authorised it.
    pub capability: Capability,
    /// Trimmed rejection note, present only for rejects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_note: Option<String>,
    /// True when `to` is the approved terminal.
    pub reaches_approved: bool,
}

impl ResolvedTransition {
    /// The record changes the caller must persist.
    #[must_use]
    pub fn mutation(&self) -> StageMutation {
        StageMutation {
            to_stage: self.to,
            rejection_note: self.rejection_note.clone(),
            approved: self.reaches_approved,
        }
    }
}

/// Changes applied to a request record by one transition.
///
/// An approve always clears the stored rejection note. A reject stores its
/// note and always clears the approved flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMutation {
    /// New current stage.
    pub to_stage: StageId,
    /// New rejection note; `None` clears it.
    pub rejection_note: Option<String>,
    /// New value of the approved flag.
    pub approved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(action: Action, note: Option<&str>, to: u32, approved: bool) -> ResolvedTransition {
        ResolvedTransition {
            from: StageId(19),
            to: StageId(to),
            action,
            capability: Capability::from("local/roombooking:step4"),
            rejection_note: note.map(str::to_string),
            reaches_approved: approved,
        }
    }

    #[test]
    fn test_approve_mutation_clears_note() {
        let mutation = resolved(Action::Approve, None, 20, true).mutation();
        assert_eq!(mutation.to_stage, StageId(20));
        assert!(mutation.rejection_note.is_none());
        assert!(mutation.approved);
    }

    #[test]
    fn test_reject_mutation_sets_note_and_unsets_approved() {
        let mutation = resolved(Action::Reject, Some("missing info"), 16, false).mutation();
        assert_eq!(mutation.rejection_note.as_deref(), Some("missing info"));
        assert!(!mutation.approved);
    }
}
