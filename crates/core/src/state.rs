//! Conversation state — the record threaded through every node of a run.
//!
//! The message history is append-only: nothing in the router removes,
//! reorders, or edits a message once pushed. `next_route` is routing
//! metadata written by the classifier step and read only by the dispatcher.

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::route::RouteLabel;

/// Shared state for one routing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// Ordered, chronological messages.
    #[serde(default)]
    messages: Vec<Message>,

    /// The stored routing decision. `None` until classification completes.
    #[serde(default, alias = "next", skip_serializing_if = "Option::is_none")]
    next_route: Option<RouteLabel>,
}

impl ConversationState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state from an initial message history.
    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
            next_route: None,
        }
    }

    /// The message history, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message to the history.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recent human-authored message, scanning from the end.
    pub fn last_human_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_human())
    }

    /// The stored routing decision, if classification has run.
    pub fn next_route(&self) -> Option<RouteLabel> {
        self.next_route
    }

    /// Store the routing decision for the dispatcher.
    pub fn set_next_route(&mut self, route: RouteLabel) {
        self.next_route = Some(route);
    }

    /// Drop the routing decision (e.g. before resuming with a new turn).
    pub fn clear_route(&mut self) {
        self.next_route = None;
    }

    /// Merge a partial update: messages concatenate, scalars overwrite.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if let Some(route) = update.next_route {
            self.next_route = Some(route);
        }
    }

    /// Consume the state and return its messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// A partial [`ConversationState`] returned by a node.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    /// Messages to append, in order.
    pub messages: Vec<Message>,
    /// Routing decision to store, if any.
    pub next_route: Option<RouteLabel>,
}

impl StateUpdate {
    /// An update that appends the given messages.
    pub fn messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            next_route: None,
        }
    }

    /// An update that appends a single reply.
    pub fn reply(message: Message) -> Self {
        Self::messages(vec![message])
    }

    /// An update that stores a routing decision.
    pub fn route(route: RouteLabel) -> Self {
        Self {
            messages: Vec::new(),
            next_route: Some(route),
        }
    }
}
