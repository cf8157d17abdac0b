//! The immutable stage graph of one workflow kind.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::{Action, Capability, Stage, StageId};

/// How the approved terminal answers a further approve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPolicy {
    /// The approved terminal approves into itself with no capability, so
    /// the permission check refuses every actor.
    SelfLoop,
    /// The approved terminal has no outgoing transitions at all.
    NoTransition,
}

impl Default for TerminalPolicy {
    fn default() -> Self {
        Self::SelfLoop
    }
}

/// A directed edge from a stage, keyed by action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Source stage.
    pub from: StageId,
    /// The action that follows this edge.
    pub action: Action,
    /// Target stage.
    pub to: StageId,
    /// Capability the actor must hold. `None` is never granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_capability: Option<Capability>,
}

impl Transition {
    /// Creates a transition.
    #[must_use]
    pub fn new(
        from: StageId,
        action: Action,
        to: StageId,
        required_capability: Option<Capability>,
    ) -> Self {
        Self {
            from,
            action,
            to,
            required_capability,
        }
    }

    /// Returns true if the edge leads back to its source.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Static description of one workflow kind.
///
/// Built once through [`WorkflowBuilder`](super::WorkflowBuilder), which
/// guarantees exactly one initial stage, one approved terminal and one
/// rejected terminal, and exactly one approve edge per non-terminal stage.
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    pub(super) kind: String,
    pub(super) label: String,
    pub(super) terminal_policy: TerminalPolicy,
    pub(super) stages: HashMap<StageId, Stage>,
    pub(super) stage_order: Vec<StageId>,
    pub(super) transitions: HashMap<(StageId, Action), Transition>,
    pub(super) initial: StageId,
    pub(super) approved: StageId,
    pub(super) rejected: StageId,
}

impl WorkflowDefinition {
    /// The workflow kind, e.g. `room_booking`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The terminal policy this workflow was built with.
    #[must_use]
    pub const fn terminal_policy(&self) -> TerminalPolicy {
        self.terminal_policy
    }

    /// Looks up a stage.
    #[must_use]
    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.get(&id)
    }

    /// Returns true if the stage belongs to this workflow.
    #[must_use]
    pub fn contains(&self, id: StageId) -> bool {
        self.stages.contains_key(&id)
    }

    /// Stages in definition order.
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.stage_order.iter().filter_map(|id| self.stages.get(id))
    }

    /// All transitions, ordered by source stage position then action.
    #[must_use]
    pub fn transitions(&self) -> Vec<&Transition> {
        self.stage_order
            .iter()
            .flat_map(|id| Action::ALL.iter().map(move |action| (*id, *action)))
            .filter_map(|key| self.transitions.get(&key))
            .collect()
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for a built definition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The stage new requests are created in.
    #[must_use]
    pub const fn initial_stage(&self) -> StageId {
        self.initial
    }

    /// The approved terminal.
    #[must_use]
    pub const fn approved_stage(&self) -> StageId {
        self.approved
    }

    /// The rejected terminal.
    #[must_use]
    pub const fn rejected_stage(&self) -> StageId {
        self.rejected
    }

    /// The raw edge for `action` out of `stage`, including the approved
    /// terminal's self-loop under [`TerminalPolicy::SelfLoop`].
    #[must_use]
    pub fn transition(&self, stage: StageId, action: Action) -> Option<&Transition> {
        self.transitions.get(&(stage, action))
    }

    /// The stage reached by approving from `stage`.
    ///
    /// `None` when `stage` is terminal or unknown.
    #[must_use]
    pub fn get_next_on_approve(&self, stage: StageId) -> Option<&Stage> {
        self.next_stage(stage, Action::Approve)
    }

    /// The stage reached by rejecting from `stage`.
    ///
    /// `None` when rejection is not defined from `stage`.
    #[must_use]
    pub fn get_next_on_reject(&self, stage: StageId) -> Option<&Stage> {
        self.next_stage(stage, Action::Reject)
    }

    /// Capability needed to approve from `stage`.
    #[must_use]
    pub fn required_capability_for_approve(&self, stage: StageId) -> Option<&Capability> {
        self.transition(stage, Action::Approve)
            .and_then(|t| t.required_capability.as_ref())
    }

    /// Capability needed to reject from `stage`.
    #[must_use]
    pub fn required_capability_for_reject(&self, stage: StageId) -> Option<&Capability> {
        self.transition(stage, Action::Reject)
            .and_then(|t| t.required_capability.as_ref())
    }

    /// Returns true if `stage` is the approved terminal.
    #[must_use]
    pub fn is_approved_terminal(&self, stage: StageId) -> bool {
        stage == self.approved
    }

    /// Returns true if `stage` is the rejected terminal.
    #[must_use]
    pub fn is_rejected_terminal(&self, stage: StageId) -> bool {
        stage == self.rejected
    }

    /// Returns true for either terminal.
    #[must_use]
    pub fn is_terminal(&self, stage: StageId) -> bool {
        self.is_approved_terminal(stage) || self.is_rejected_terminal(stage)
    }

    fn next_stage(&self, stage: StageId, action: Action) -> Option<&Stage> {
        if self.is_terminal(stage) {
            return None;
        }
        self.transition(stage, action)
            .and_then(|t| self.stages.get(&t.to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::catalog;

    fn room() -> WorkflowDefinition {
        catalog::room_booking().build().unwrap()
    }

    #[test]
    fn test_next_on_approve_walks_the_chain() {
        let wf = room();
        let next: Vec<u32> = [16, 17, 18, 19]
            .iter()
            .map(|id| wf.get_next_on_approve(StageId(*id)).unwrap().id.get())
            .collect();
        assert_eq!(next, vec![17, 18, 19, 20]);
    }

    #[test]
    fn test_next_on_approve_none_for_terminal_or_unknown() {
        let wf = room();
        assert!(wf.get_next_on_approve(StageId(20)).is_none());
        assert!(wf.get_next_on_approve(StageId(21)).is_none());
        assert!(wf.get_next_on_approve(StageId(99)).is_none());
    }

    #[test]
    fn test_next_on_reject() {
        let wf = room();
        assert_eq!(wf.get_next_on_reject(StageId(16)).unwrap().id, StageId(21));
        assert_eq!(wf.get_next_on_reject(StageId(18)).unwrap().id, StageId(16));
        assert!(wf.get_next_on_reject(StageId(20)).is_none());
        assert!(wf.get_next_on_reject(StageId(21)).is_none());
    }

    #[test]
    fn test_required_capabilities() {
        let wf = room();
        assert_eq!(
            wf.required_capability_for_approve(StageId(16)).map(Capability::as_str),
            Some("local/roombooking:step1")
        );
        assert_eq!(
            wf.required_capability_for_reject(StageId(17)).map(Capability::as_str),
            Some("local/roombooking:step2")
        );
        assert!(wf.required_capability_for_approve(StageId(20)).is_none());
        assert!(wf.required_capability_for_reject(StageId(21)).is_none());
    }

    #[test]
    fn test_terminal_predicates() {
        let wf = room();
        assert!(wf.is_approved_terminal(StageId(20)));
        assert!(wf.is_rejected_terminal(StageId(21)));
        assert!(!wf.is_terminal(StageId(19)));
    }

    #[test]
    fn test_self_loop_is_visible_in_raw_table() {
        let wf = room();
        let edge = wf.transition(StageId(20), Action::Approve).unwrap();
        assert!(edge.is_self_loop());
        assert!(edge.required_capability.is_none());
    }

    #[test]
    fn test_no_transition_policy_has_no_terminal_edges() {
        let wf = catalog::room_booking()
            .with_terminal_policy(TerminalPolicy::NoTransition)
            .build()
            .unwrap();
        assert!(wf.transition(StageId(20), Action::Approve).is_none());
        assert!(wf.get_next_on_approve(StageId(20)).is_none());
    }

    #[test]
    fn test_transitions_are_ordered() {
        let wf = room();
        let first = wf.transitions()[0];
        assert_eq!(first.from, StageId(16));
        assert_eq!(first.action, Action::Approve);
    }
}
