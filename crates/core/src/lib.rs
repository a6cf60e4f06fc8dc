//! # Switchyard Core
//!
//! Domain types, traits, and error definitions for the Switchyard intent router.
//! This crate has **no framework dependencies** — it defines the domain model
//! that the router, providers, and CLI implement against.
//!
//! ## Design Philosophy
//!
//! The two outbound seams of a routing run are defined as traits here:
//! - [`Provider`] — the text-generation oracle (classification and replies)
//! - [`RouteHandler`] — a terminal handler the dispatch graph invokes per route
//!
//! Implementations live in their respective crates, so tests can swap in
//! deterministic doubles without touching the graph.

pub mod error;
pub mod event;
pub mod handler;
pub mod message;
pub mod provider;
pub mod route;
pub mod state;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, RouteError, RunError, RunStage};
pub use event::{DomainEvent, EventBus};
pub use handler::RouteHandler;
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolChoice, ToolDefinition};
pub use route::{RouteLabel, RouterDecision};
pub use state::{ConversationState, StateUpdate};
