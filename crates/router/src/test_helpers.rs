//! Shared test doubles for router tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use switchyard_core::error::ProviderError;
use switchyard_core::message::{Message, MessageToolCall, Role};
use switchyard_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use switchyard_core::{ConversationState, RouteError, RouteHandler, RouteLabel, StateUpdate};

/// A mock provider that returns a sequence of scripted responses and
/// records every request it receives.
///
/// Panics if more calls are made than responses provided.
pub struct ScriptedProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            panic!(
                "ScriptedProvider: no more responses (call #{})",
                requests.len()
            );
        }
        requests.push(request);
        responses.remove(0)
    }
}

/// A deterministic oracle that classifies by keyword and answers free-text
/// requests by listing the capabilities found in its system prompt.
pub struct KeywordOracle {
    calls: AtomicUsize,
}

impl KeywordOracle {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for KeywordOracle {
    fn name(&self) -> &str {
        "keyword_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if request.tool_choice.is_some() {
            let latest = request
                .messages
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.to_lowercase())
                .unwrap_or_default();
            let route = if ["aapl", "ticker", "stock", "portfolio"]
                .iter()
                .any(|k| latest.contains(k))
            {
                RouteLabel::Stockbroker
            } else if ["trip", "weekend", "hotel", "restaurant"]
                .iter()
                .any(|k| latest.contains(k))
            {
                RouteLabel::TripPlanner
            } else {
                RouteLabel::GeneralInput
            };
            return Ok(route_response(route));
        }

        let system = request
            .messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let capabilities: Vec<&str> = system
            .lines()
            .filter(|l| l.starts_with("- "))
            .collect();
        Ok(text_response(&format!(
            "I can help with:\n{}",
            capabilities.join("\n")
        )))
    }
}

/// A provider that always fails with a network error.
pub struct DownProvider;

#[async_trait]
impl Provider for DownProvider {
    fn name(&self) -> &str {
        "down"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// A route handler that appends a fixed reply and counts its invocations.
pub struct StubHandler {
    name: String,
    reply: String,
    calls: AtomicUsize,
}

impl StubHandler {
    pub fn new(name: &str, reply: &str) -> Self {
        Self {
            name: name.into(),
            reply: reply.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteHandler for StubHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _state: &ConversationState) -> Result<StateUpdate, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(StateUpdate::reply(Message::assistant(&self.reply)))
    }
}

/// Create a simple text response (no tool calls).
pub fn text_response(text: &str) -> ProviderResponse {
    response_with(Message::assistant(text))
}

/// Create a forced-choice response selecting `route`.
pub fn route_response(route: RouteLabel) -> ProviderResponse {
    tool_call_response(
        "router",
        &serde_json::json!({ "route": route.as_str() }).to_string(),
    )
}

/// Create a response carrying one tool call with raw arguments.
pub fn tool_call_response(name: &str, arguments: &str) -> ProviderResponse {
    let mut msg = Message::assistant("");
    msg.tool_calls = vec![MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }];
    response_with(msg)
}

fn response_with(message: Message) -> ProviderResponse {
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}
