//! Error types for the Switchyard domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Oracle transport failures, routing failures, and whole-run failures each
//! have their own type so callers can tell which stage broke.

use thiserror::Error;

use crate::route::RouteLabel;

/// Failures talking to an oracle (LLM provider).
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered with a success status but a body we could not use.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Failures inside a single routing run.
///
/// None of these are retried by the router; all of them reach the caller.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The history holds no human-authored message to classify.
    #[error("No human message found in conversation state")]
    NoInput,

    /// The oracle answered but no decision could be extracted.
    #[error("Classification failed: {0}")]
    ClassificationFailure(String),

    /// Network or provider failure. Retrying is the caller's job.
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(#[from] ProviderError),

    /// A decision outside the closed route set.
    #[error("Invalid route: {0:?}")]
    InvalidRoute(String),

    /// A specialized handler reported a failure of its own.
    #[error("Handler '{route}' failed: {reason}")]
    HandlerFailed { route: RouteLabel, reason: String },
}

/// The stage of a run at which it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Intent classification (before any handler ran).
    Classification,
    /// Transition from the classifier to a route node.
    Dispatch,
    /// Execution of the handler for the given route.
    Handler(RouteLabel),
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::Classification => write!(f, "classification"),
            RunStage::Dispatch => write!(f, "dispatch"),
            RunStage::Handler(route) => write!(f, "handler '{route}'"),
        }
    }
}

/// A failed run: which stage failed and why.
#[derive(Debug, Error)]
#[error("Run failed during {stage}: {source}")]
pub struct RunError {
    pub stage: RunStage,
    #[source]
    pub source: RouteError,
}

impl RunError {
    pub fn new(stage: RunStage, source: RouteError) -> Self {
        Self { stage, source }
    }

    /// The underlying routing error.
    pub fn kind(&self) -> &RouteError {
        &self.source
    }
}
