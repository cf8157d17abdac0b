//! Error types for approval workflows.
//!
//! Every failure an action can hit is an expected, recoverable outcome that
//! the action handler reports back to the user. Only storage failures marked
//! unrecoverable are fatal.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::{Action, Capability, RequestId, StageId};

/// The error returned by the engine and the workflow service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// A reject was attempted without a note.
    #[error("Rejection reason required")]
    MissingRejectionReason,

    /// No transition is defined for the action from the current stage.
    #[error("No {action} transition from stage {stage}")]
    NoSuchTransition {
        /// The current stage.
        stage: StageId,
        /// The attempted action.
        action: Action,
    },

    /// The actor lacks the capability the transition requires.
    #[error("Permission denied for {action} from stage {stage} (requires {})", .capability.as_ref().map_or("nothing grantable", Capability::as_str))]
    PermissionDenied {
        /// The current stage.
        stage: StageId,
        /// The attempted action.
        action: Action,
        /// The capability that was checked; `None` means nobody qualifies.
        capability: Option<Capability>,
    },

    /// The request store has no record with this id.
    #[error("Request not found: {request_id}")]
    RequestNotFound {
        /// The missing request.
        request_id: RequestId,
    },

    /// The stored stage changed between load and save.
    #[error("Request {request_id} was modified concurrently (expected stage {expected}, found {actual})")]
    ConcurrentModification {
        /// The request.
        request_id: RequestId,
        /// Stage read by `load_stage`.
        expected: StageId,
        /// Stage found at save time.
        actual: StageId,
    },

    /// Lower-level storage failure.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the failure.
        message: String,
        /// Whether the store can keep serving requests.
        recoverable: bool,
    },
}

impl WorkflowError {
    /// Creates a no-such-transition error.
    #[must_use]
    pub const fn no_such_transition(stage: StageId, action: Action) -> Self {
        Self::NoSuchTransition { stage, action }
    }

    /// Creates a permission-denied error.
    #[must_use]
    pub const fn permission_denied(
        stage: StageId,
        action: Action,
        capability: Option<Capability>,
    ) -> Self {
        Self::PermissionDenied {
            stage,
            action,
            capability,
        }
    }

    /// Creates a recoverable storage error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            recoverable: true,
        }
    }

    /// Creates an unrecoverable storage error.
    #[must_use]
    pub fn fatal_storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            recoverable: false,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingRejectionReason => "missing_rejection_reason",
            Self::NoSuchTransition { .. } => "no_such_transition",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::RequestNotFound { .. } => "request_not_found",
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::Storage { .. } => "storage_error",
        }
    }

    /// The message shown to the user. Internal detail stays in logs.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingRejectionReason => "Rejection reason required.",
            Self::NoSuchTransition { .. } => "Invalid action for current status.",
            Self::PermissionDenied { .. } => "You do not have permission.",
            Self::RequestNotFound { .. } => "Request not found.",
            Self::ConcurrentModification { .. } => {
                "This request was just updated, please retry."
            }
            Self::Storage { .. } => "Unexpected error.",
        }
    }

    /// Returns true only for unrecoverable storage failures.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Storage {
                recoverable: false,
                ..
            }
        )
    }

    /// Converts to a dictionary representation for logs and events.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.code()));

        match self {
            Self::MissingRejectionReason => {}
            Self::NoSuchTransition { stage, action } => {
                map.insert("stage".to_string(), serde_json::json!(stage));
                map.insert("action".to_string(), serde_json::json!(action));
            }
            Self::PermissionDenied {
                stage,
                action,
                capability,
            } => {
                map.insert("stage".to_string(), serde_json::json!(stage));
                map.insert("action".to_string(), serde_json::json!(action));
                map.insert("capability".to_string(), serde_json::json!(capability));
            }
            Self::RequestNotFound { request_id } => {
                map.insert("request_id".to_string(), serde_json::json!(request_id));
            }
            Self::ConcurrentModification {
                request_id,
                expected,
                actual,
            } => {
                map.insert("request_id".to_string(), serde_json::json!(request_id));
                map.insert("expected_stage".to_string(), serde_json::json!(expected));
                map.insert("actual_stage".to_string(), serde_json::json!(actual));
            }
            Self::Storage { recoverable, .. } => {
                map.insert("recoverable".to_string(), serde_json::json!(recoverable));
            }
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Errors a [`RequestStore`](crate::store::RequestStore) can return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record with this id.
    #[error("Request not found: {0}")]
    NotFound(RequestId),

    /// A record with this id already exists.
    #[error("Request already exists: {0}")]
    AlreadyExists(RequestId),

    /// Compare-and-swap on the current stage failed.
    #[error("Stage of request {request_id} is {actual}, expected {expected}")]
    StageMismatch {
        /// The request.
        request_id: RequestId,
        /// The expected prior stage.
        expected: StageId,
        /// The stage actually stored.
        actual: StageId,
    },

    /// The backend is unavailable or failed.
    #[error("Storage backend failure: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
        /// Whether the store can keep serving requests.
        recoverable: bool,
    },
}

impl StoreError {
    /// Creates a recoverable backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            recoverable: true,
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(request_id) => Self::RequestNotFound { request_id },
            StoreError::StageMismatch {
                request_id,
                expected,
                actual,
            } => Self::ConcurrentModification {
                request_id,
                expected,
                actual,
            },
            StoreError::AlreadyExists(request_id) => {
                Self::storage(format!("Request already exists: {request_id}"))
            }
            StoreError::Backend {
                message,
                recoverable,
            } => Self::Storage {
                message,
                recoverable,
            },
        }
    }
}

/// Metadata about a definition error for better diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "WORKFLOW-DEF-INITIAL").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }
}

/// Error raised when a workflow definition fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid workflow '{workflow}': {message}")]
pub struct DefinitionError {
    /// The workflow kind being built.
    pub workflow: String,
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<StageId>,
    /// Diagnostic info.
    pub info: ErrorInfo,
}

impl DefinitionError {
    /// Creates a new definition error.
    #[must_use]
    pub fn new(
        workflow: impl Into<String>,
        code: &str,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            workflow: workflow.into(),
            info: ErrorInfo::new(code, message.clone()),
            message,
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<StageId>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.info = self.info.with_fix_hint(hint);
        self
    }

    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.info.code
    }
}

/// Definition error codes.
pub mod codes {
    /// The workflow has no stages.
    pub const EMPTY: &str = "WORKFLOW-DEF-EMPTY";
    /// Two stages share an id.
    pub const DUPLICATE_STAGE: &str = "WORKFLOW-DEF-DUPLICATE_STAGE";
    /// A transition references a stage that does not exist.
    pub const UNKNOWN_STAGE: &str = "WORKFLOW-DEF-UNKNOWN_STAGE";
    /// Not exactly one initial stage.
    pub const INITIAL: &str = "WORKFLOW-DEF-INITIAL";
    /// Not exactly one approved and one rejected terminal.
    pub const TERMINAL: &str = "WORKFLOW-DEF-TERMINAL";
    /// A non-terminal stage without exactly one approve transition.
    pub const APPROVE_COUNT: &str = "WORKFLOW-DEF-APPROVE_COUNT";
    /// Two transitions for the same stage and action.
    pub const DUPLICATE_TRANSITION: &str = "WORKFLOW-DEF-DUPLICATE_TRANSITION";
    /// A terminal stage has an edge other than the approved self-loop.
    pub const TERMINAL_EDGE: &str = "WORKFLOW-DEF-TERMINAL_EDGE";
    /// A capability string is malformed, or missing on a transition that needs one.
    pub const CAPABILITY: &str = "WORKFLOW-DEF-CAPABILITY";
    /// The configuration could not be read or parsed.
    pub const CONFIG: &str = "WORKFLOW-DEF-CONFIG";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            WorkflowError::MissingRejectionReason.user_message(),
            "Rejection reason required."
        );
        assert_eq!(
            WorkflowError::permission_denied(StageId(16), Action::Approve, None).user_message(),
            "You do not have permission."
        );
        assert_eq!(
            WorkflowError::storage("disk full").user_message(),
            "Unexpected error."
        );
    }

    #[test]
    fn test_permission_denied_display() {
        let err = WorkflowError::permission_denied(
            StageId(16),
            Action::Approve,
            Some(Capability::from("local/roombooking:step1")),
        );
        assert!(err.to_string().contains("local/roombooking:step1"));

        let err = WorkflowError::permission_denied(StageId(20), Action::Approve, None);
        assert!(err.to_string().contains("nothing grantable"));
    }

    #[test]
    fn test_store_error_conversion() {
        let err: WorkflowError = StoreError::NotFound(RequestId(3)).into();
        assert_eq!(err, WorkflowError::RequestNotFound { request_id: RequestId(3) });

        let err: WorkflowError = StoreError::StageMismatch {
            request_id: RequestId(3),
            expected: StageId(16),
            actual: StageId(17),
        }
        .into();
        assert_eq!(err.code(), "concurrent_modification");
    }

    #[test]
    fn test_is_fatal() {
        assert!(!WorkflowError::storage("timeout").is_fatal());
        assert!(WorkflowError::fatal_storage("corrupt").is_fatal());
        assert!(!WorkflowError::MissingRejectionReason.is_fatal());
    }

    #[test]
    fn test_to_dict() {
        let err = WorkflowError::no_such_transition(StageId(21), Action::Approve);
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "no_such_transition");
        assert_eq!(dict.get("stage").unwrap(), 21);
        assert_eq!(dict.get("action").unwrap(), "approve");
    }

    #[test]
    fn test_definition_error() {
        let err = DefinitionError::new("room_booking", codes::INITIAL, "No initial stage")
            .with_fix_hint("Mark exactly one stage with role 'initial'.");

        assert_eq!(err.code(), "WORKFLOW-DEF-INITIAL");
        assert!(err.to_string().contains("room_booking"));
        assert!(err.info.fix_hint.is_some());
    }
}
