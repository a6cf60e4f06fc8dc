//! Dispatch graph — one decision node, one terminal node per route.
//!
//! ```text
//! Start ──► Classify ──► Route(label) ──► End
//! ```
//!
//! The only branching edge leaves `Classify`, and [`next_node`] picks its
//! target purely from the decision stored on the state. Each run visits
//! exactly one `Route` node and never returns to `Classify`.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use switchyard_core::message::Message;
use switchyard_core::{
    ConversationState, DomainEvent, EventBus, RouteError, RouteHandler, RouteLabel, RunError,
    RunStage, StateUpdate,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classifier::IntentClassifier;
use crate::fallback::GeneralInputHandler;

const DEFAULT_GRAPH_NAME: &str = "Generative UI Agent";

/// A node of the dispatch state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphNode {
    Start,
    Classify,
    Route(RouteLabel),
    End,
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphNode::Start => f.write_str("__start__"),
            GraphNode::Classify => f.write_str("router"),
            GraphNode::Route(route) => f.write_str(route.as_str()),
            GraphNode::End => f.write_str("__end__"),
        }
    }
}

/// Pure transition function of the dispatch graph.
///
/// Reads only `next_route`. `End` is absorbing. Reaching `Classify` with no
/// stored decision is a contract violation and reported as
/// [`RouteError::InvalidRoute`].
pub fn next_node(current: GraphNode, state: &ConversationState) -> Result<GraphNode, RouteError> {
    match current {
        GraphNode::Start => Ok(GraphNode::Classify),
        GraphNode::Classify => state
            .next_route()
            .map(GraphNode::Route)
            .ok_or_else(|| RouteError::InvalidRoute("<unset>".into())),
        GraphNode::Route(_) | GraphNode::End => Ok(GraphNode::End),
    }
}

/// The outcome of one complete traversal.
#[derive(Debug, Clone)]
pub struct GraphRun {
    /// The final state, ready for the caller's persistence layer.
    pub state: ConversationState,
    /// The route whose handler ran.
    pub route: RouteLabel,
    /// Nodes in visiting order, `Start` through `End`.
    pub path: Vec<GraphNode>,
    appended: usize,
}

impl GraphRun {
    /// The messages appended by the handler during this run.
    pub fn replies(&self) -> &[Message] {
        let messages = self.state.messages();
        &messages[messages.len() - self.appended..]
    }
}

/// One handler slot per route label.
struct RouteTable {
    stockbroker: Arc<dyn RouteHandler>,
    trip_planner: Arc<dyn RouteHandler>,
    general_input: Arc<dyn RouteHandler>,
}

impl RouteTable {
    fn get(&self, route: RouteLabel) -> &Arc<dyn RouteHandler> {
        match route {
            RouteLabel::Stockbroker => &self.stockbroker,
            RouteLabel::TripPlanner => &self.trip_planner,
            RouteLabel::GeneralInput => &self.general_input,
        }
    }
}

/// The compiled router graph.
///
/// Shareable across tasks; each [`invoke`](Self::invoke) owns its own state.
pub struct DispatchGraph {
    name: String,
    classifier: IntentClassifier,
    routes: RouteTable,
    event_bus: Arc<EventBus>,
}

impl DispatchGraph {
    pub fn builder() -> DispatchGraphBuilder {
        DispatchGraphBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the graph from a bare message history.
    pub async fn invoke_messages(
        &self,
        messages: impl IntoIterator<Item = Message>,
    ) -> Result<GraphRun, RunError> {
        self.invoke(ConversationState::from_messages(messages)).await
    }

    /// Run one full traversal from `Start` to `End`.
    ///
    /// Any decision left on a resumed state is discarded first, so the
    /// classifier always decides the current turn.
    pub async fn invoke(&self, mut state: ConversationState) -> Result<GraphRun, RunError> {
        state.clear_route();
        let initial_len = state.messages().len();

        let mut node = GraphNode::Start;
        let mut path = vec![node];
        let mut selected = None;

        while node != GraphNode::End {
            match node {
                GraphNode::Start | GraphNode::End => {}
                GraphNode::Classify => {
                    let decision = self
                        .classifier
                        .decide(&state)
                        .await
                        .map_err(|e| self.fail(RunStage::Classification, e))?;
                    state.apply(StateUpdate::route(decision.route));

                    info!(graph = %self.name, route = %decision.route, "Route selected");
                    self.event_bus.publish(DomainEvent::RouteSelected {
                        graph: self.name.clone(),
                        route: decision.route,
                        timestamp: Utc::now(),
                    });
                }
                GraphNode::Route(route) => {
                    let handler = self.routes.get(route);
                    let started = Instant::now();
                    debug!(graph = %self.name, handler = handler.name(), "Running handler");

                    let update = handler
                        .handle(&state)
                        .await
                        .map_err(|e| self.fail(RunStage::Handler(route), e))?;
                    let appended = update.messages.len();
                    state.apply(update);
                    selected = Some(route);

                    let duration_ms = started.elapsed().as_millis() as u64;
                    debug!(graph = %self.name, %route, appended, duration_ms, "Handler completed");
                    self.event_bus.publish(DomainEvent::HandlerCompleted {
                        graph: self.name.clone(),
                        route,
                        messages_appended: appended,
                        duration_ms,
                        timestamp: Utc::now(),
                    });
                }
            }

            node = next_node(node, &state).map_err(|e| self.fail(RunStage::Dispatch, e))?;
            debug!(graph = %self.name, %node, "Transition");
            path.push(node);
        }

        let route = selected
            .ok_or_else(|| self.fail(RunStage::Dispatch, RouteError::InvalidRoute("<unset>".into())))?;

        Ok(GraphRun {
            appended: state.messages().len() - initial_len,
            state,
            route,
            path,
        })
    }

    fn fail(&self, stage: RunStage, error: RouteError) -> RunError {
        warn!(graph = %self.name, %stage, error = %error, "Run failed");
        self.event_bus.publish(DomainEvent::RunFailed {
            graph: self.name.clone(),
            stage: stage.to_string(),
            error_message: error.to_string(),
            timestamp: Utc::now(),
        });
        RunError::new(stage, error)
    }
}

/// Errors from assembling a graph with missing parts.
#[derive(Debug, Error)]
pub enum GraphBuildError {
    #[error("No intent classifier configured")]
    MissingClassifier,

    #[error("No handler registered for route '{0}'")]
    MissingHandler(RouteLabel),
}

/// Assembles a [`DispatchGraph`]; every route must have a handler.
#[derive(Default)]
pub struct DispatchGraphBuilder {
    name: Option<String>,
    classifier: Option<IntentClassifier>,
    stockbroker: Option<Arc<dyn RouteHandler>>,
    trip_planner: Option<Arc<dyn RouteHandler>>,
    general_input: Option<Arc<dyn RouteHandler>>,
    event_bus: Option<Arc<EventBus>>,
}

impl DispatchGraphBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Register the handler for a route, replacing any earlier one.
    pub fn route(mut self, route: RouteLabel, handler: Arc<dyn RouteHandler>) -> Self {
        *self.slot(route) = Some(handler);
        self
    }

    /// Register the fallback as the catch-all handler.
    pub fn fallback(self, handler: GeneralInputHandler) -> Self {
        self.route(RouteLabel::GeneralInput, Arc::new(handler))
    }

    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn slot(&mut self, route: RouteLabel) -> &mut Option<Arc<dyn RouteHandler>> {
        match route {
            RouteLabel::Stockbroker => &mut self.stockbroker,
            RouteLabel::TripPlanner => &mut self.trip_planner,
            RouteLabel::GeneralInput => &mut self.general_input,
        }
    }

    pub fn build(self) -> Result<DispatchGraph, GraphBuildError> {
        let classifier = self.classifier.ok_or(GraphBuildError::MissingClassifier)?;
        let routes = RouteTable {
            stockbroker: self
                .stockbroker
                .ok_or(GraphBuildError::MissingHandler(RouteLabel::Stockbroker))?,
            trip_planner: self
                .trip_planner
                .ok_or(GraphBuildError::MissingHandler(RouteLabel::TripPlanner))?,
            general_input: self
                .general_input
                .ok_or(GraphBuildError::MissingHandler(RouteLabel::GeneralInput))?,
        };

        Ok(DispatchGraph {
            name: self.name.unwrap_or_else(|| DEFAULT_GRAPH_NAME.into()),
            classifier,
            routes,
            event_bus: self.event_bus.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use switchyard_core::error::ProviderError;

    struct Harness {
        oracle: Arc<ScriptedProvider>,
        stockbroker: Arc<StubHandler>,
        trip_planner: Arc<StubHandler>,
        graph: DispatchGraph,
    }

    /// Graph with stub specialists and the real fallback, all sharing one
    /// scripted oracle.
    fn harness(responses: Vec<Result<switchyard_core::ProviderResponse, ProviderError>>) -> Harness {
        let oracle = Arc::new(ScriptedProvider::new(responses));
        let stockbroker = Arc::new(StubHandler::new("stockbroker", "AAPL is at $190."));
        let trip_planner = Arc::new(StubHandler::new("tripPlanner", "Lisbon itinerary ready."));

        let graph = DispatchGraph::builder()
            .classifier(IntentClassifier::new(oracle.clone(), "mock-model"))
            .route(RouteLabel::Stockbroker, stockbroker.clone())
            .route(RouteLabel::TripPlanner, trip_planner.clone())
            .fallback(GeneralInputHandler::new(oracle.clone(), "mock-model"))
            .build()
            .unwrap();

        Harness {
            oracle,
            stockbroker,
            trip_planner,
            graph,
        }
    }

    #[test]
    fn transition_function_is_pure_and_exhaustive() {
        let mut state = ConversationState::new();
        assert_eq!(next_node(GraphNode::Start, &state).unwrap(), GraphNode::Classify);
        assert!(matches!(
            next_node(GraphNode::Classify, &state),
            Err(RouteError::InvalidRoute(_))
        ));

        for route in RouteLabel::ALL {
            state.set_next_route(route);
            assert_eq!(
                next_node(GraphNode::Classify, &state).unwrap(),
                GraphNode::Route(route)
            );
            assert_eq!(next_node(GraphNode::Route(route), &state).unwrap(), GraphNode::End);
        }
        assert_eq!(next_node(GraphNode::End, &state).unwrap(), GraphNode::End);
    }

    #[test]
    fn node_display_names() {
        assert_eq!(GraphNode::Classify.to_string(), "router");
        assert_eq!(GraphNode::Route(RouteLabel::TripPlanner).to_string(), "tripPlanner");
        assert_eq!(GraphNode::End.to_string(), "__end__");
    }

    #[tokio::test]
    async fn stockbroker_query_runs_only_stockbroker() {
        let h = harness(vec![Ok(route_response(RouteLabel::Stockbroker))]);

        let run = h
            .graph
            .invoke_messages(vec![Message::user("What's AAPL trading at?")])
            .await
            .unwrap();

        assert_eq!(run.route, RouteLabel::Stockbroker);
        assert_eq!(
            run.path,
            vec![
                GraphNode::Start,
                GraphNode::Classify,
                GraphNode::Route(RouteLabel::Stockbroker),
                GraphNode::End
            ]
        );
        assert_eq!(h.stockbroker.call_count(), 1);
        assert_eq!(h.trip_planner.call_count(), 0);
        // Classification only; the fallback never called the oracle.
        assert_eq!(h.oracle.call_count(), 1);
        assert_eq!(run.replies().len(), 1);
        assert_eq!(run.replies()[0].content, "AAPL is at $190.");
        assert_eq!(run.state.next_route(), Some(RouteLabel::Stockbroker));
    }

    #[tokio::test]
    async fn trip_query_runs_trip_planner() {
        let h = harness(vec![Ok(route_response(RouteLabel::TripPlanner))]);

        let run = h
            .graph
            .invoke_messages(vec![Message::user("Plan a weekend in Lisbon")])
            .await
            .unwrap();

        assert_eq!(run.route, RouteLabel::TripPlanner);
        assert_eq!(h.trip_planner.call_count(), 1);
        assert_eq!(h.stockbroker.call_count(), 0);
    }

    #[tokio::test]
    async fn general_input_uses_fallback() {
        let h = harness(vec![
            Ok(route_response(RouteLabel::GeneralInput)),
            Ok(text_response("I can trade stocks and plan trips.")),
        ]);

        let run = h
            .graph
            .invoke_messages(vec![Message::user("What can you do?")])
            .await
            .unwrap();

        assert_eq!(run.route, RouteLabel::GeneralInput);
        assert_eq!(h.stockbroker.call_count(), 0);
        assert_eq!(h.trip_planner.call_count(), 0);
        assert_eq!(h.oracle.call_count(), 2);
        assert_eq!(run.replies()[0].content, "I can trade stocks and plan trips.");
    }

    #[tokio::test]
    async fn run_extends_history_without_reordering() {
        let h = harness(vec![Ok(route_response(RouteLabel::TripPlanner))]);
        let history = vec![
            Message::user("Hi"),
            Message::assistant("Hello! How can I help?"),
            Message::user("Plan a weekend in Lisbon"),
        ];
        let ids: Vec<String> = history.iter().map(|m| m.id.clone()).collect();

        let run = h.graph.invoke_messages(history).await.unwrap();

        let messages = run.state.messages();
        assert_eq!(messages.len(), 4);
        let prefix: Vec<String> = messages[..3].iter().map(|m| m.id.clone()).collect();
        assert_eq!(prefix, ids);
        assert_eq!(messages[3].content, "Lisbon itinerary ready.");
    }

    #[tokio::test]
    async fn empty_history_fails_with_no_input_before_any_call() {
        let h = harness(vec![]);

        let err = h.graph.invoke(ConversationState::new()).await.unwrap_err();

        assert_eq!(err.stage, RunStage::Classification);
        assert!(matches!(err.kind(), RouteError::NoInput));
        assert_eq!(h.oracle.call_count(), 0);
        assert_eq!(h.stockbroker.call_count(), 0);
        assert_eq!(h.trip_planner.call_count(), 0);
    }

    #[tokio::test]
    async fn classification_failure_never_defaults_to_a_route() {
        let h = harness(vec![Ok(text_response("probably stocks?"))]);

        let err = h
            .graph
            .invoke_messages(vec![Message::user("Buy 10 TSLA")])
            .await
            .unwrap_err();

        assert_eq!(err.stage, RunStage::Classification);
        assert!(matches!(err.kind(), RouteError::ClassificationFailure(_)));
        assert_eq!(h.stockbroker.call_count(), 0);
        assert_eq!(h.trip_planner.call_count(), 0);
    }

    #[tokio::test]
    async fn fallback_oracle_failure_reports_handler_stage() {
        let h = harness(vec![
            Ok(route_response(RouteLabel::GeneralInput)),
            Err(ProviderError::Timeout("60s".into())),
        ]);

        let err = h
            .graph
            .invoke_messages(vec![Message::user("Tell me a joke")])
            .await
            .unwrap_err();

        assert_eq!(err.stage, RunStage::Handler(RouteLabel::GeneralInput));
        assert!(matches!(err.kind(), RouteError::OracleUnavailable(_)));
    }

    #[tokio::test]
    async fn stale_decision_on_resumed_state_is_ignored() {
        let h = harness(vec![Ok(route_response(RouteLabel::Stockbroker))]);
        let mut state = ConversationState::from_messages(vec![Message::user("Sell my AAPL")]);
        state.set_next_route(RouteLabel::TripPlanner);

        let run = h.graph.invoke(state).await.unwrap();

        assert_eq!(run.route, RouteLabel::Stockbroker);
        assert_eq!(h.trip_planner.call_count(), 0);
    }

    #[tokio::test]
    async fn events_published_for_route_and_handler() {
        let oracle = Arc::new(ScriptedProvider::new(vec![Ok(route_response(
            RouteLabel::TripPlanner,
        ))]));
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();

        let graph = DispatchGraph::builder()
            .name("test-graph")
            .classifier(IntentClassifier::new(oracle.clone(), "m"))
            .route(RouteLabel::Stockbroker, Arc::new(StubHandler::new("s", "s")))
            .route(RouteLabel::TripPlanner, Arc::new(StubHandler::new("t", "t")))
            .fallback(GeneralInputHandler::new(oracle, "m"))
            .event_bus(bus)
            .build()
            .unwrap();

        graph
            .invoke_messages(vec![Message::user("Plan a weekend in Lisbon")])
            .await
            .unwrap();

        match rx.recv().await.unwrap().as_ref() {
            DomainEvent::RouteSelected { graph, route, .. } => {
                assert_eq!(graph, "test-graph");
                assert_eq!(*route, RouteLabel::TripPlanner);
            }
            other => panic!("Expected RouteSelected, got {other:?}"),
        }
        match rx.recv().await.unwrap().as_ref() {
            DomainEvent::HandlerCompleted {
                route,
                messages_appended,
                ..
            } => {
                assert_eq!(*route, RouteLabel::TripPlanner);
                assert_eq!(*messages_appended, 1);
            }
            other => panic!("Expected HandlerCompleted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_runs_use_independent_state() {
        let oracle = Arc::new(KeywordOracle::new());
        let stockbroker = Arc::new(StubHandler::new("stockbroker", "quote"));
        let trip_planner = Arc::new(StubHandler::new("tripPlanner", "plan"));
        let graph = DispatchGraph::builder()
            .classifier(IntentClassifier::new(oracle.clone(), "m"))
            .route(RouteLabel::Stockbroker, stockbroker.clone())
            .route(RouteLabel::TripPlanner, trip_planner.clone())
            .fallback(GeneralInputHandler::new(oracle.clone(), "m"))
            .build()
            .unwrap();

        let (a, b) = tokio::join!(
            graph.invoke_messages(vec![Message::user("What's AAPL trading at?")]),
            graph.invoke_messages(vec![Message::user("Plan a weekend in Lisbon")]),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.route, RouteLabel::Stockbroker);
        assert_eq!(b.route, RouteLabel::TripPlanner);
        assert_eq!(a.state.messages().len(), 2);
        assert_eq!(b.state.messages().len(), 2);
        assert_eq!(stockbroker.call_count(), 1);
        assert_eq!(trip_planner.call_count(), 1);
    }

    #[test]
    fn builder_requires_every_route() {
        let oracle = Arc::new(ScriptedProvider::new(vec![]));
        let err = DispatchGraph::builder()
            .classifier(IntentClassifier::new(oracle.clone(), "m"))
            .route(RouteLabel::Stockbroker, Arc::new(StubHandler::new("s", "s")))
            .fallback(GeneralInputHandler::new(oracle, "m"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, GraphBuildError::MissingHandler(RouteLabel::TripPlanner)));

        let err = DispatchGraph::builder().build().err().unwrap();
        assert!(matches!(err, GraphBuildError::MissingClassifier));
    }
}
