//! Domain event system — observe routing runs without coupling to the graph.
//!
//! The dispatch graph publishes an event when it picks a route, when the
//! selected handler finishes, and when a run fails. Subscribers (metrics,
//! audit logs, UIs) react without the graph knowing about them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::route::RouteLabel;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The classifier resolved a route for the current turn
    RouteSelected {
        graph: String,
        route: RouteLabel,
        timestamp: DateTime<Utc>,
    },

    /// The selected handler finished and its update was merged
    HandlerCompleted {
        graph: String,
        route: RouteLabel,
        messages_appended: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A run stopped before reaching its end node
    RunFailed {
        graph: String,
        stage: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
