//! Event emission for workflow actions.

mod event;
mod sink;

pub use event::{WorkflowEvent, TRANSITION_APPLIED, TRANSITION_REFUSED};
pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
