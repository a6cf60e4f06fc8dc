//! Intent classifier — maps the latest human message to one route label.
//!
//! The oracle is offered a single `router` tool whose only argument is an
//! enum of route labels, and is required to call it. Only the most recent
//! human message is sent, together with a fixed system instruction.
//! Generation runs at temperature 0 and is never streamed.

use std::sync::Arc;

use serde::Deserialize;
use switchyard_core::error::ProviderError;
use switchyard_core::message::Message;
use switchyard_core::provider::{Provider, ProviderRequest};
use switchyard_core::{ConversationState, RouteError, RouteLabel, RouterDecision};
use tracing::debug;

use crate::prompts::{self, CLASSIFIER_PROMPT, ROUTER_TOOL_NAME};

/// Classifies a turn into a [`RouteLabel`] through a forced-choice oracle call.
pub struct IntentClassifier {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: Option<u32>,
}

impl IntentClassifier {
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

    /// Classify the latest human message.
    pub async fn classify(&self, state: &ConversationState) -> Result<RouteLabel, RouteError> {
        Ok(self.decide(state).await?.route)
    }

    /// Classify the latest human message, returning the full decision.
    ///
    /// Fails with [`RouteError::NoInput`] before calling the oracle when the
    /// history holds no human message.
    pub async fn decide(&self, state: &ConversationState) -> Result<RouterDecision, RouteError> {
        let latest = state.last_human_message().ok_or(RouteError::NoInput)?;

        let request = ProviderRequest::new(
            &self.model,
            vec![Message::system(CLASSIFIER_PROMPT), latest.clone()],
        )
        .with_temperature(0.0)
        .with_max_tokens(self.max_tokens)
        .force_tool(prompts::router_tool());

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            "Classifying latest human message"
        );

        let response = self.provider.complete(request).await.map_err(|e| match e {
            ProviderError::InvalidResponse(reason) => RouteError::ClassificationFailure(reason),
            other => RouteError::OracleUnavailable(other),
        })?;
        let route = extract_route(&response.message)?;

        debug!(%route, "Classifier decision");
        Ok(RouterDecision { route })
    }
}

#[derive(Deserialize)]
struct RouterArgs {
    route: String,
}

/// Pull the route label out of the oracle's forced tool call.
///
/// Only a call to `router` counts; calls to any other tool are ignored.
fn extract_route(message: &Message) -> Result<RouteLabel, RouteError> {
    let call = message
        .tool_calls
        .iter()
        .find(|c| c.name == ROUTER_TOOL_NAME)
        .ok_or_else(|| {
            RouteError::ClassificationFailure("no router call found in oracle response".into())
        })?;

    let args: RouterArgs = serde_json::from_str(&call.arguments).map_err(|e| {
        RouteError::ClassificationFailure(format!(
            "unparseable router arguments {:?}: {e}",
            call.arguments
        ))
    })?;

    args.route.parse()
}
