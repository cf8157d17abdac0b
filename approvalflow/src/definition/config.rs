//! Serializable workflow tables.
//!
//! A workflow kind is described as data, loaded once at start-up, and
//! turned into a [`WorkflowDefinition`] through the validating builder.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{TerminalPolicy, WorkflowBuilder, WorkflowDefinition};
use crate::core::{Action, Capability, Stage, StageId, StageRole};
use crate::errors::{codes, DefinitionError};

/// Table form of one workflow kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Workflow kind, used as the registry key.
    pub kind: String,
    /// Display label. Defaults to the kind.
    #[serde(default)]
    pub label: String,
    /// Behaviour of the approved terminal.
    #[serde(default)]
    pub terminal_policy: TerminalPolicy,
    /// Stages in chain order.
    pub stages: Vec<StageConfig>,
    /// Explicit transitions. When empty the linear shape is derived.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionConfig>,
}

/// Table form of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage id as persisted on request records.
    pub id: StageId,
    /// Display label.
    pub label: String,
    /// Stage role.
    #[serde(default)]
    pub role: StageRole,
    /// Capability needed to act from this stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<Capability>,
}

impl StageConfig {
    /// Creates a stage entry.
    #[must_use]
    pub fn new(id: u32, label: impl Into<String>, role: StageRole) -> Self {
        Self {
            id: StageId(id),
            label: label.into(),
            role,
            capability: None,
        }
    }

    /// Sets the capability.
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<Capability>) -> Self {
        self.capability = Some(capability.into());
        self
    }
}

/// Table form of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Source stage.
    pub from: StageId,
    /// Action.
    pub action: Action,
    /// Target stage.
    pub to: StageId,
    /// Required capability.
    #[serde(default)]
    pub capability: Option<Capability>,
}

impl WorkflowConfig {
    /// Creates an empty table for a kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            label: String::new(),
            terminal_policy: TerminalPolicy::default(),
            stages: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the terminal policy.
    #[must_use]
    pub fn with_terminal_policy(mut self, policy: TerminalPolicy) -> Self {
        self.terminal_policy = policy;
        self
    }

    /// Appends a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: StageConfig) -> Self {
        self.stages.push(stage);
        self
    }

    /// Parses a JSON table.
    ///
    /// # Errors
    ///
    /// Returns a `WORKFLOW-DEF-CONFIG` error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(json).map_err(|e| {
            DefinitionError::new("<unknown>", codes::CONFIG, format!("Invalid workflow JSON: {e}"))
        })
    }

    /// Reads and parses a JSON table from disk.
    ///
    /// # Errors
    ///
    /// Returns a `WORKFLOW-DEF-CONFIG` error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DefinitionError::new(
                "<unknown>",
                codes::CONFIG,
                format!("Cannot read {}: {e}", path.display()),
            )
        })?;
        Self::from_json_str(&json)
    }

    /// Serializes the table to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns a `WORKFLOW-DEF-CONFIG` error if serialization fails.
    pub fn to_json(&self) -> Result<String, DefinitionError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            DefinitionError::new(&self.kind, codes::CONFIG, format!("Cannot serialize: {e}"))
        })
    }

    /// Validates the table and builds the definition.
    ///
    /// # Errors
    ///
    /// Returns the builder's [`DefinitionError`] if the table is invalid.
    pub fn build(&self) -> Result<WorkflowDefinition, DefinitionError> {
        let mut builder = WorkflowBuilder::new(&self.kind).terminal_policy(self.terminal_policy);
        if !self.label.is_empty() {
            builder = builder.label(&self.label);
        }

        for stage in &self.stages {
            let mut entry = Stage::new(stage.id.get(), &stage.label).with_role(stage.role);
            entry.required_capability = stage.capability.clone();
            builder = builder.stage(entry);
        }

        for t in &self.transitions {
            builder = builder.transition(t.from.get(), t.action, t.to.get(), t.capability.clone());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RESIDENCE_JSON: &str = r#"{
        "kind": "residence_booking",
        "label": "Residence booking",
        "stages": [
            {"id": 1, "label": "Leader review", "role": "initial", "capability": "local/residencebooking:step1"},
            {"id": 2, "label": "Final review", "capability": "local/residencebooking:step2"},
            {"id": 3, "label": "Approved", "role": "approved"},
            {"id": 4, "label": "Rejected", "role": "rejected"}
        ]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let config = WorkflowConfig::from_json_str(RESIDENCE_JSON).unwrap();
        assert_eq!(config.terminal_policy, TerminalPolicy::SelfLoop);
        assert_eq!(config.stages[1].role, StageRole::Review);

        let wf = config.build().unwrap();
        assert_eq!(wf.kind(), "residence_booking");
        assert_eq!(wf.label(), "Residence booking");
        assert_eq!(wf.get_next_on_reject(StageId(2)).unwrap().id, StageId(1));
    }

    #[test]
    fn test_explicit_transitions_and_policy() {
        let json = r#"{
            "kind": "short",
            "terminal_policy": "no_transition",
            "stages": [
                {"id": 1, "label": "Review", "role": "initial"},
                {"id": 2, "label": "Approved", "role": "approved"},
                {"id": 3, "label": "Rejected", "role": "rejected"}
            ],
            "transitions": [
                {"from": 1, "action": "approve", "to": 2, "capability": "local/short:review"},
                {"from": 1, "action": "reject", "to": 3, "capability": "local/short:review"}
            ]
        }"#;
        let wf = WorkflowConfig::from_json_str(json).unwrap().build().unwrap();

        assert_eq!(wf.terminal_policy(), TerminalPolicy::NoTransition);
        assert_eq!(wf.label(), "short");
        assert!(wf.transition(StageId(2), Action::Approve).is_none());
    }

    #[test]
    fn test_malformed_json() {
        let err = WorkflowConfig::from_json_str("{\"kind\": 1}").unwrap_err();
        assert_eq!(err.code(), codes::CONFIG);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RESIDENCE_JSON.as_bytes()).unwrap();

        let config = WorkflowConfig::from_path(file.path()).unwrap();
        assert_eq!(config.kind, "residence_booking");
    }

    #[test]
    fn test_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkflowConfig::from_path(dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code(), codes::CONFIG);
    }

    #[test]
    fn test_json_export_reloads() {
        let config = WorkflowConfig::from_json_str(RESIDENCE_JSON).unwrap();
        let json = config.to_json().unwrap();
        assert_eq!(WorkflowConfig::from_json_str(&json).unwrap(), config);
    }
}
