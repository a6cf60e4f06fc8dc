//! RouteHandler trait — the contract for terminal nodes of the dispatch graph.

use async_trait::async_trait;

use crate::error::RouteError;
use crate::state::{ConversationState, StateUpdate};

/// A handler invoked for exactly one route.
///
/// The graph passes a read-only view of the state and merges the returned
/// [`StateUpdate`] itself. Handlers never look at `next_route`.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    /// A short name used in logs (e.g. "stockbroker").
    fn name(&self) -> &str;

    /// Produce this handler's partial update for the current turn.
    async fn handle(&self, state: &ConversationState) -> Result<StateUpdate, RouteError>;
}
