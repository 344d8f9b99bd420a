//! Inbound events - everything that drives the interpreter from outside.
//!
//! The interpreter never calls back into the host asynchronously. Timers and
//! asset batches are identified by ids handed to the host, and the host posts
//! the matching event back once the timer expires or the batch completes.

use scenario_model::{ObjectId, PuzzleId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a pending `delayed_actions` timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub Uuid);

impl TimerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one batch of asset requests issued by a stage load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event processed by the interpreter, one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Pointer-down on an interactive object, navigation arrows included.
    ObjectClicked(ObjectId),
    CodeSubmitted(String),
    HintRequested { puzzle: PuzzleId, index: usize },
    /// A button of the open blocking message.
    MessageButtonClicked(usize),
    /// Click anywhere while a non-blocking message is open.
    MessageDismissed,
    AssetsReady(BatchId),
    TimerFired(TimerId),
}

impl EngineEvent {
    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            EngineEvent::ObjectClicked(_) => "object_clicked",
            EngineEvent::CodeSubmitted(_) => "code_submitted",
            EngineEvent::HintRequested { .. } => "hint_requested",
            EngineEvent::MessageButtonClicked(_) => "message_button_clicked",
            EngineEvent::MessageDismissed => "message_dismissed",
            EngineEvent::AssetsReady(_) => "assets_ready",
            EngineEvent::TimerFired(_) => "timer_fired",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(TimerId::new(), TimerId::new());
        assert_ne!(BatchId::new(), BatchId::new());
    }

    #[test]
    fn test_event_json_roundtrip() {
        let event = EngineEvent::HintRequested {
            puzzle: PuzzleId::from("p1"),
            index: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(serde_json::from_str::<EngineEvent>(&json).unwrap(), event);
        assert_eq!(event.label(), "hint_requested");
    }
}
