//! LLM-backed specialist handler.
//!
//! Real deployments plug their own stockbroker / trip-planner subgraphs in
//! as [`RouteHandler`]s. This handler is the built-in stand-in: a persona
//! prompt for the route plus the full history, answered in free text.

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::message::Message;
use switchyard_core::provider::{Provider, ProviderRequest};
use switchyard_core::{ConversationState, RouteError, RouteHandler, RouteLabel, StateUpdate};
use tracing::debug;

use crate::prompts;

pub struct SpecialistHandler {
    route: RouteLabel,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    system_prompt: String,
}

impl SpecialistHandler {
    pub fn new(route: RouteLabel, provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            route,
            provider,
            model: model.into(),
            temperature: 0.0,
            system_prompt: prompts::specialist_prompt(route),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the built-in persona prompt. `None` keeps it.
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        if let Some(prompt) = system_prompt {
            self.system_prompt = prompt;
        }
        self
    }

    pub fn route(&self) -> RouteLabel {
        self.route
    }
}

#[async_trait]
impl RouteHandler for SpecialistHandler {
    fn name(&self) -> &str {
        self.route.as_str()
    }

    async fn handle(&self, state: &ConversationState) -> Result<StateUpdate, RouteError> {
        let mut messages = vec![Message::system(&self.system_prompt)];
        messages.extend(state.messages().iter().cloned());

        let request =
            ProviderRequest::new(&self.model, messages).with_temperature(self.temperature);

        debug!(route = %self.route, model = %self.model, "Running specialist");

        let response = self.provider.complete(request).await?;
        let reply = Message::assistant(response.message.content).with_metadata(
            "route",
            serde_json::Value::String(self.route.as_str().into()),
        );
        Ok(StateUpdate::reply(reply))
    }
}
