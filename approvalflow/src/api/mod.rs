//! JSON action boundary.
//!
//! Translates an `{action, id, rejection_note}` body into a service call
//! and the result into `{status, message}`. Session and CSRF checks happen
//! before this layer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Action, Actor, RequestId};
use crate::engine::{AppliedTransition, WorkflowService};
use crate::errors::WorkflowError;

/// Message returned when the action name or body cannot be understood.
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request.";

const FALLBACK_BODY: &str = r#"{"status":"error","message":"Unexpected error."}"#;

/// Incoming action body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// `"approve"` or `"reject"`.
    pub action: String,
    /// Target request.
    pub id: RequestId,
    /// Reason, required for rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_note: Option<String>,
}

impl ActionRequest {
    /// Creates a request body.
    #[must_use]
    pub fn new(action: Action, id: u64) -> Self {
        Self {
            action: action.as_str().to_string(),
            id: RequestId(id),
            rejection_note: None,
        }
    }

    /// Sets the rejection note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.rejection_note = Some(note.into());
        self
    }
}

/// Outcome flag of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The action was applied.
    Success,
    /// The action was refused or failed.
    Error,
}

/// Outgoing response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Outcome.
    pub status: ResponseStatus,
    /// User-facing message.
    pub message: String,
}

impl ActionResponse {
    /// Successful response.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
        }
    }

    /// Error response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
        }
    }

    /// Builds the response for a service result.
    #[must_use]
    pub fn from_result(result: &Result<AppliedTransition, WorkflowError>) -> Self {
        match result {
            Ok(applied) => Self::success(match applied.action {
                Action::Approve => "Request approved.",
                Action::Reject => "Request rejected.",
            }),
            Err(err) => Self::error(err.user_message()),
        }
    }

    /// Returns true for a success response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// How refusals map to HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusMode {
    /// Always 200; the outcome is only in the body.
    #[default]
    AlwaysOk,
    /// Distinct 4xx/5xx codes per error kind.
    Strict,
}

impl StatusMode {
    /// Status code for an error.
    #[must_use]
    pub const fn http_status(self, err: &WorkflowError) -> u16 {
        match self {
            Self::AlwaysOk => 200,
            Self::Strict => match err {
                WorkflowError::MissingRejectionReason => 400,
                WorkflowError::PermissionDenied { .. } => 403,
                WorkflowError::RequestNotFound { .. } => 404,
                WorkflowError::NoSuchTransition { .. }
                | WorkflowError::ConcurrentModification { .. } => 409,
                WorkflowError::Storage { .. } => 500,
            },
        }
    }

    const fn bad_request(self) -> u16 {
        match self {
            Self::AlwaysOk => 200,
            Self::Strict => 400,
        }
    }
}

/// Handles one decoded action body on behalf of `actor`.
pub async fn handle_action(
    service: &WorkflowService,
    request: &ActionRequest,
    actor: &Actor,
    mode: StatusMode,
) -> (u16, ActionResponse) {
    let Ok(action) = request.action.parse::<Action>() else {
        debug!(action = %request.action, request_id = %request.id, "Unknown action");
        return (mode.bad_request(), ActionResponse::error(INVALID_REQUEST_MESSAGE));
    };

    let result = service
        .apply(request.id, action, actor, request.rejection_note.as_deref())
        .await;
    let status = match &result {
        Ok(_) => 200,
        Err(err) => mode.http_status(err),
    };
    (status, ActionResponse::from_result(&result))
}

/// Handles a raw JSON body and returns the status and serialized response.
pub async fn handle_json(
    service: &WorkflowService,
    body: &str,
    actor: &Actor,
    mode: StatusMode,
) -> (u16, String) {
    let (status, response) = match serde_json::from_str::<ActionRequest>(body) {
        Ok(request) => handle_action(service, &request, actor, mode).await,
        Err(e) => {
            debug!(error = %e, "Malformed action body");
            (mode.bad_request(), ActionResponse::error(INVALID_REQUEST_MESSAGE))
        }
    };
    let json = serde_json::to_string(&response).unwrap_or_else(|_| FALLBACK_BODY.to_string());
    (status, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageId;
    use crate::testing::TestHarness;
    use pretty_assertions::assert_eq;

    fn harness() -> TestHarness {
        let harness = TestHarness::room_booking().unwrap();
        harness.create_request(7).unwrap();
        harness
    }

    #[test]
    fn test_request_json_shape() {
        let request: ActionRequest =
            serde_json::from_str(r#"{"action": "reject", "id": 7, "rejection_note": "why"}"#)
                .unwrap();
        assert_eq!(request, ActionRequest::new(Action::Reject, 7).with_note("why"));

        let response = serde_json::to_value(ActionResponse::error("Request not found.")).unwrap();
        assert_eq!(
            response,
            serde_json::json!({"status": "error", "message": "Request not found."})
        );
    }

    #[test]
    fn test_strict_status_mapping() {
        let cases = [
            (WorkflowError::MissingRejectionReason, 400),
            (WorkflowError::no_such_transition(StageId(21), Action::Approve), 409),
            (WorkflowError::permission_denied(StageId(16), Action::Approve, None), 403),
            (WorkflowError::RequestNotFound { request_id: RequestId(1) }, 404),
            (
                WorkflowError::ConcurrentModification {
                    request_id: RequestId(1),
                    expected: StageId(16),
                    actual: StageId(17),
                },
                409,
            ),
            (WorkflowError::storage("down"), 500),
        ];
        for (err, status) in cases {
            assert_eq!(StatusMode::Strict.http_status(&err), status, "{err}");
            assert_eq!(StatusMode::AlwaysOk.http_status(&err), 200);
        }
    }

    #[tokio::test]
    async fn test_success() {
        let harness = harness();
        harness.grant("alice", "local/roombooking:step1");

        let (status, response) = handle_action(
            &harness.service,
            &ActionRequest::new(Action::Approve, 7),
            &Actor::new("alice"),
            StatusMode::Strict,
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(response, ActionResponse::success("Request approved."));
        assert_eq!(harness.record(7).unwrap().current_stage, StageId(17));
    }

    #[tokio::test]
    async fn test_refusal_always_ok() {
        let harness = harness();

        let (status, response) = handle_action(
            &harness.service,
            &ActionRequest::new(Action::Approve, 7),
            &Actor::new("mallory"),
            StatusMode::AlwaysOk,
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(response, ActionResponse::error("You do not have permission."));
    }

    #[tokio::test]
    async fn test_missing_reason_strict() {
        let harness = harness();
        harness.grant("alice", "local/roombooking:step1");

        let (status, response) = handle_action(
            &harness.service,
            &ActionRequest::new(Action::Reject, 7).with_note("  "),
            &Actor::new("alice"),
            StatusMode::Strict,
        )
        .await;

        assert_eq!(status, 400);
        assert_eq!(response.message, "Rejection reason required.");
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let harness = harness();
        let request = ActionRequest {
            action: "escalate".to_string(),
            id: RequestId(7),
            rejection_note: None,
        };

        let (status, response) =
            handle_action(&harness.service, &request, &Actor::new("a"), StatusMode::Strict).await;
        assert_eq!(status, 400);
        assert_eq!(response.message, INVALID_REQUEST_MESSAGE);
        assert!(harness.events.is_empty());
    }

    #[tokio::test]
    async fn test_json_body() {
        let harness = harness();

        let (status, body) = handle_json(
            &harness.service,
            r#"{"action": "approve", "id": 99}"#,
            &Actor::new("a"),
            StatusMode::Strict,
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(
            serde_json::from_str::<ActionResponse>(&body).unwrap(),
            ActionResponse::error("Request not found.")
        );

        let (status, body) =
            handle_json(&harness.service, "not json", &Actor::new("a"), StatusMode::AlwaysOk).await;
        assert_eq!(status, 200);
        assert!(body.contains(INVALID_REQUEST_MESSAGE));
    }
}
