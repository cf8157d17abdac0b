//! Workflow events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{Action, Actor, RequestId};
use crate::engine::AppliedTransition;
use crate::errors::WorkflowError;
use crate::utils::{format_iso8601, iso_timestamp};

/// Emitted after a transition was persisted.
pub const TRANSITION_APPLIED: &str = "workflow.transition.applied";
/// Emitted when an action was refused or failed.
pub const TRANSITION_REFUSED: &str = "workflow.transition.refused";

/// An event describing one workflow action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Unique id of this event.
    pub id: Uuid,
    /// The event type (e.g., "workflow.transition.applied").
    #[serde(rename = "type")]
    pub event_type: String,
    /// When the event occurred (ISO 8601).
    pub timestamp: String,
    /// The event payload data.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl WorkflowEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            timestamp: iso_timestamp(),
            data: serde_json::Map::new(),
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Reads a data field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Creates a "workflow.transition.applied" event.
    #[must_use]
    pub fn applied(workflow: &str, applied: &AppliedTransition) -> Self {
        let mut event = Self::new(TRANSITION_APPLIED)
            .add_data("workflow", serde_json::json!(workflow))
            .add_data("request_id", serde_json::json!(applied.request_id))
            .add_data("action", serde_json::json!(applied.action))
            .add_data("actor", serde_json::json!(applied.actor))
            .add_data("from_stage", serde_json::json!(applied.from_stage))
            .add_data("to_stage", serde_json::json!(applied.to_stage));
        event.timestamp = format_iso8601(&applied.applied_at);
        if let Some(note) = &applied.rejection_note {
            event = event.add_data("rejection_note", serde_json::json!(note));
        }
        event
    }

    /// Creates a "workflow.transition.refused" event.
    #[must_use]
    pub fn refused(
        workflow: &str,
        request_id: RequestId,
        action: Action,
        actor: &Actor,
        error: &WorkflowError,
    ) -> Self {
        let error: serde_json::Map<String, serde_json::Value> = error.to_dict().into_iter().collect();
        Self::new(TRANSITION_REFUSED)
            .add_data("workflow", serde_json::json!(workflow))
            .add_data("request_id", serde_json::json!(request_id))
            .add_data("action", serde_json::json!(action))
            .add_data("actor", serde_json::json!(actor))
            .add_data("error", serde_json::Value::Object(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageId;
    use crate::utils::from_unix_seconds;

    #[test]
    fn test_event_add_data() {
        let event = WorkflowEvent::new("test.event")
            .add_data("foo", serde_json::json!("bar"))
            .add_data("count", serde_json::json!(42));

        assert_eq!(event.data.len(), 2);
        assert_eq!(event.get("count"), Some(&serde_json::json!(42)));
    }

    #[test]
    fn test_applied_event() {
        let applied = AppliedTransition {
            request_id: RequestId(5),
            from_stage: StageId(17),
            to_stage: StageId(16),
            action: Action::Reject,
            actor: Actor::new("reviewer"),
            rejection_note: Some("missing info".to_string()),
            applied_at: from_unix_seconds(0).unwrap(),
        };
        let event = WorkflowEvent::applied("room_booking", &applied);

        assert_eq!(event.event_type, TRANSITION_APPLIED);
        assert_eq!(event.timestamp, "1970-01-01T00:00:00.000000+00:00");
        assert_eq!(event.get("to_stage"), Some(&serde_json::json!(16)));
        assert_eq!(event.get("rejection_note"), Some(&serde_json::json!("missing info")));
    }

    #[test]
    fn test_refused_event() {
        let event = WorkflowEvent::refused(
            "room_booking",
            RequestId(5),
            Action::Reject,
            &Actor::new("reviewer"),
            &WorkflowError::MissingRejectionReason,
        );

        assert_eq!(event.event_type, TRANSITION_REFUSED);
        assert_eq!(
            event.get("error").and_then(|e| e.get("type")),
            Some(&serde_json::json!("missing_rejection_reason"))
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = WorkflowEvent::new("test").add_data("x", serde_json::json!(1));
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: WorkflowEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event, deserialized);
    }
}
