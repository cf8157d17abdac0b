//! Workflow builder with validation.

use regex::Regex;
use std::collections::HashMap;

use super::{TerminalPolicy, Transition, WorkflowDefinition};
use crate::core::{Action, Capability, Stage, StageId, StageRole};
use crate::errors::{codes, DefinitionError};

/// Pattern every capability name must match, e.g. `local/roombooking:step1`.
pub const CAPABILITY_PATTERN: &str = r"^[a-z][a-z0-9_]*(/[a-z0-9_]+)?:[a-z0-9_]+$";

/// Builder for validated workflow definitions.
///
/// Without explicit transitions the builder derives the linear shape:
/// the initial stage and review stages chain by approval in listed order
/// into the approved terminal, rejecting from the initial stage goes to the
/// rejected terminal, and rejecting from any later review stage goes back
/// to the initial stage.
#[derive(Debug, Clone)]
pub struct WorkflowBuilder {
    kind: String,
    label: String,
    terminal_policy: TerminalPolicy,
    stages: Vec<Stage>,
    transitions: Vec<Transition>,
}

impl WorkflowBuilder {
    /// Creates a builder for the given workflow kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            label: kind.clone(),
            kind,
            terminal_policy: TerminalPolicy::default(),
            stages: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the terminal policy.
    #[must_use]
    pub fn terminal_policy(mut self, policy: TerminalPolicy) -> Self {
        self.terminal_policy = policy;
        self
    }

    /// Adds a stage.
    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Adds an explicit transition. Once any is added, none are derived.
    #[must_use]
    pub fn transition(
        mut self,
        from: u32,
        action: Action,
        to: u32,
        capability: Option<Capability>,
    ) -> Self {
        self.transitions.push(Transition::new(
            StageId(from),
            action,
            StageId(to),
            capability,
        ));
        self
    }

    /// Validates and builds the definition.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] describing the first violated rule.
    pub fn build(self) -> Result<WorkflowDefinition, DefinitionError> {
        let pattern = Regex::new(CAPABILITY_PATTERN).map_err(|e| {
            DefinitionError::new(&self.kind, codes::CONFIG, format!("Bad capability pattern: {e}"))
        })?;

        if self.stages.is_empty() {
            return Err(self
                .error(codes::EMPTY, "Workflow has no stages")
                .with_fix_hint("Add the initial, review and terminal stages."));
        }

        let mut stages = HashMap::new();
        let mut stage_order = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            if stages.insert(stage.id, stage.clone()).is_some() {
                return Err(self
                    .error(codes::DUPLICATE_STAGE, format!("Stage {} is defined twice", stage.id))
                    .with_stages(vec![stage.id]));
            }
            stage_order.push(stage.id);
            if let Some(cap) = &stage.required_capability {
                self.check_capability(&pattern, cap, stage.id)?;
            }
        }

        let initial = self.single_role(StageRole::Initial, codes::INITIAL)?;
        let approved = self.single_role(StageRole::Approved, codes::TERMINAL)?;
        let rejected = self.single_role(StageRole::Rejected, codes::TERMINAL)?;

        let mut edges = if self.transitions.is_empty() {
            self.derive_linear(initial, approved, rejected)?
        } else {
            self.transitions.clone()
        };

        if self.terminal_policy == TerminalPolicy::SelfLoop
            && !edges
                .iter()
                .any(|t| t.from == approved && t.action == Action::Approve)
        {
            edges.push(Transition::new(approved, Action::Approve, approved, None));
        }

        let mut transitions = HashMap::new();
        for edge in edges {
            self.check_edge(&pattern, &stages, &edge, approved)?;
            let key = (edge.from, edge.action);
            if transitions.contains_key(&key) {
                return Err(self
                    .error(
                        codes::DUPLICATE_TRANSITION,
                        format!("Stage {} has two {} transitions", edge.from, edge.action),
                    )
                    .with_stages(vec![edge.from]));
            }
            transitions.insert(key, edge);
        }

        for stage in &self.stages {
            if !stage.is_terminal() && !transitions.contains_key(&(stage.id, Action::Approve)) {
                return Err(self
                    .error(
                        codes::APPROVE_COUNT,
                        format!("Stage {} has no approve transition", stage.id),
                    )
                    .with_stages(vec![stage.id])
                    .with_fix_hint("Every non-terminal stage needs exactly one approve transition."));
            }
        }

        Ok(WorkflowDefinition {
            kind: self.kind,
            label: self.label,
            terminal_policy: self.terminal_policy,
            stages,
            stage_order,
            transitions,
            initial,
            approved,
            rejected,
        })
    }

    fn derive_linear(
        &self,
        initial: StageId,
        approved: StageId,
        rejected: StageId,
    ) -> Result<Vec<Transition>, DefinitionError> {
        let chain: Vec<&Stage> = self
            .stages
            .iter()
            .filter(|s| s.is_initial())
            .chain(self.stages.iter().filter(|s| s.role == StageRole::Review))
            .collect();

        let mut edges = Vec::with_capacity(chain.len() * 2);
        for (index, stage) in chain.iter().enumerate() {
            let Some(cap) = stage.required_capability.clone() else {
                return Err(self
                    .error(
                        codes::CAPABILITY,
                        format!("Review stage {} has no capability", stage.id),
                    )
                    .with_stages(vec![stage.id]));
            };
            let next = chain.get(index + 1).map_or(approved, |s| s.id);
            let back = if stage.id == initial { rejected } else { initial };

            edges.push(Transition::new(stage.id, Action::Approve, next, Some(cap.clone())));
            edges.push(Transition::new(stage.id, Action::Reject, back, Some(cap)));
        }
        Ok(edges)
    }

    fn check_edge(
        &self,
        pattern: &Regex,
        stages: &HashMap<StageId, Stage>,
        edge: &Transition,
        approved: StageId,
    ) -> Result<(), DefinitionError> {
        for id in [edge.from, edge.to] {
            if !stages.contains_key(&id) {
                return Err(self
                    .error(
                        codes::UNKNOWN_STAGE,
                        format!("Transition {} -> {} references unknown stage {id}", edge.from, edge.to),
                    )
                    .with_stages(vec![edge.from, edge.to]));
            }
        }

        let from_terminal = stages.get(&edge.from).is_some_and(Stage::is_terminal);
        if from_terminal {
            let allowed = self.terminal_policy == TerminalPolicy::SelfLoop
                && edge.from == approved
                && edge.action == Action::Approve
                && edge.is_self_loop()
                && edge.required_capability.is_none();
            if !allowed {
                return Err(self
                    .error(
                        codes::TERMINAL_EDGE,
                        format!("Terminal stage {} cannot {} to {}", edge.from, edge.action, edge.to),
                    )
                    .with_stages(vec![edge.from])
                    .with_fix_hint("Only the approved terminal may approve into itself, without a capability."));
            }
            return Ok(());
        }

        match &edge.required_capability {
            Some(cap) => self.check_capability(pattern, cap, edge.from),
            None => Err(self
                .error(
                    codes::CAPABILITY,
                    format!("Transition {} from stage {} has no capability", edge.action, edge.from),
                )
                .with_stages(vec![edge.from])),
        }
    }

    fn check_capability(
        &self,
        pattern: &Regex,
        cap: &Capability,
        stage: StageId,
    ) -> Result<(), DefinitionError> {
        if pattern.is_match(cap.as_str()) {
            Ok(())
        } else {
            Err(self
                .error(codes::CAPABILITY, format!("Malformed capability '{cap}'"))
                .with_stages(vec![stage])
                .with_fix_hint("Use the form 'component/name:capability'."))
        }
    }

    fn single_role(&self, role: StageRole, code: &str) -> Result<StageId, DefinitionError> {
        let matching: Vec<StageId> = self
            .stages
            .iter()
            .filter(|s| s.role == role)
            .map(|s| s.id)
            .collect();
        match matching.as_slice() {
            [id] => Ok(*id),
            _ => Err(self
                .error(
                    code,
                    format!("Expected exactly one {role} stage, found {}", matching.len()),
                )
                .with_stages(matching)),
        }
    }

    fn error(&self, code: &str, message: impl Into<String>) -> DefinitionError {
        DefinitionError::new(&self.kind, code, message)
    }
}
