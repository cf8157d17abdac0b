//! Stage identifiers, roles, and stage descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Capability;

/// Identifier of a stage, stable across a workflow.
///
/// Stage ids are the numeric status codes persisted on request records,
/// so they serialize as bare integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub u32);

impl StageId {
    /// Creates a stage id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StageId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// The role a stage plays in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    /// The stage new requests are created in. Also the first review stage.
    Initial,
    /// A review stage between the initial stage and the approved terminal.
    Review,
    /// The terminal stage of an approved request.
    Approved,
    /// The terminal stage of a rejected request.
    Rejected,
}

impl Default for StageRole {
    fn default() -> Self {
        Self::Review
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Review => write!(f, "review"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl StageRole {
    /// Returns true for the approved and rejected terminals.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// A named point in an approval workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Unique id within the workflow.
    pub id: StageId,
    /// Display text. Localisation happens outside this crate.
    pub label: String,
    /// Role of the stage.
    #[serde(default)]
    pub role: StageRole,
    /// Capability needed to act from this stage; `None` for terminals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_capability: Option<Capability>,
}

impl Stage {
    /// Creates a review stage.
    #[must_use]
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id: StageId(id),
            label: label.into(),
            role: StageRole::Review,
            required_capability: None,
        }
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: StageRole) -> Self {
        self.role = role;
        self
    }

    /// Sets the capability needed to act from this stage.
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<Capability>) -> Self {
        self.required_capability = Some(capability.into());
        self
    }

    /// Returns true if this is the initial stage.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.role == StageRole::Initial
    }

    /// Returns true if this is the approved terminal.
    #[must_use]
    pub fn is_terminal_approved(&self) -> bool {
        self.role == StageRole::Approved
    }

    /// Returns true if this is the rejected terminal.
    #[must_use]
    pub fn is_terminal_rejected(&self) -> bool {
        self.role == StageRole::Rejected
    }

    /// Returns true for either terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.role.is_terminal()
    }
}
