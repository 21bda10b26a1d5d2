//! Workflow event system — lets front ends observe the state machine.
//!
//! Events are published when the workflow advances or fails. A terminal or
//! web front end subscribes and re-renders; nothing in the core depends on
//! anyone listening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::experience::ExperienceId;

/// All workflow events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowEvent {
    /// A query was embedded and its candidate context computed
    ContextReady {
        query: String,
        candidates: usize,
        timestamp: DateTime<Utc>,
    },

    /// The completer produced a response draft
    ResponseGenerated {
        context_len: usize,
        response_chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// A finalized experience was pushed to the store
    ExperienceStored {
        id: ExperienceId,
        timestamp: DateTime<Utc>,
    },

    /// The session went back to idle without storing
    SessionRestarted { timestamp: DateTime<Utc> },

    /// The store was cleared or reset to its seed dataset
    HistoryReplaced {
        remaining: usize,
        timestamp: DateTime<Utc>,
    },

    /// A user-facing alert was raised
    AlertRaised {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for workflow events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<WorkflowEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: WorkflowEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<WorkflowEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let id = ExperienceId::for_content("q", "r");
        bus.publish(WorkflowEvent::ExperienceStored {
            id: id.clone(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            WorkflowEvent::ExperienceStored { id: stored, .. } => assert_eq!(stored, &id),
            other => panic!("Expected ExperienceStored event, got {other:?}"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(WorkflowEvent::SessionRestarted {
            timestamp: Utc::now(),
        });
    }
}
