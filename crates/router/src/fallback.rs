//! Fallback handler — the `generalInput` route.
//!
//! Answers conversationally when no specialized route applies. Unlike the
//! classifier it sends the *full* history, since nothing has narrowed the
//! task, and it asks for unconstrained free text at temperature 0. Its
//! system instruction lists the specialized routes so "what can you do?"
//! gets an accurate answer.

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::message::Message;
use switchyard_core::provider::{Provider, ProviderRequest};
use switchyard_core::{ConversationState, RouteError, RouteHandler, RouteLabel, StateUpdate};
use tracing::debug;

use crate::prompts;

/// Generic conversational reply for the catch-all route.
pub struct GeneralInputHandler {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: Option<u32>,
}

impl GeneralInputHandler {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Produce the reply message. Oracle failures surface as
    /// [`RouteError::OracleUnavailable`].
    pub async fn respond(&self, state: &ConversationState) -> Result<Message, RouteError> {
        let mut messages = Vec::with_capacity(state.messages().len() + 1);
        messages.push(Message::system(prompts::general_input_prompt()));
        messages.extend(state.messages().iter().cloned());

        let request = ProviderRequest::new(&self.model, messages)
            .with_temperature(0.0)
            .with_max_tokens(self.max_tokens);

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            history = state.messages().len(),
            "Generating general reply"
        );

        let response = self.provider.complete(request).await?;
        Ok(Message::assistant(response.message.content).with_metadata(
            "route",
            serde_json::Value::String(RouteLabel::GeneralInput.as_str().into()),
        ))
    }
}

#[async_trait]
impl RouteHandler for GeneralInputHandler {
    fn name(&self) -> &str {
        RouteLabel::GeneralInput.as_str()
    }

    async fn handle(&self, state: &ConversationState) -> Result<StateUpdate, RouteError> {
        Ok(StateUpdate::reply(self.respond(state).await?))
    }
}
