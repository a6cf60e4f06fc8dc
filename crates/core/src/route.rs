//! Route labels — the closed set of branches a turn can be dispatched to.
//!
//! The set is fixed at compile time. Adding a route means adding a variant,
//! and every exhaustive `match` over [`RouteLabel`] (prompt schema, handler
//! lookup, graph builder) fails to compile until the new route is wired.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;

/// A discrete category selecting which handler processes the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteLabel {
    /// Ticker prices, buying/selling, portfolio.
    Stockbroker,
    /// Trip planning: restaurants and places to stay.
    TripPlanner,
    /// Catch-all conversational reply.
    GeneralInput,
}

impl RouteLabel {
    /// Every route, specialized routes first and the catch-all last.
    pub const ALL: [RouteLabel; 3] = [
        RouteLabel::Stockbroker,
        RouteLabel::TripPlanner,
        RouteLabel::GeneralInput,
    ];

    /// The wire name used in prompts, tool schemas, and persisted state.
    pub fn as_str(self) -> &'static str {
        match self {
            RouteLabel::Stockbroker => "stockbroker",
            RouteLabel::TripPlanner => "tripPlanner",
            RouteLabel::GeneralInput => "generalInput",
        }
    }

    /// Whether this is the catch-all route served by the fallback handler.
    pub fn is_catch_all(self) -> bool {
        matches!(self, RouteLabel::GeneralInput)
    }

    /// One-line capability description shown to the oracle and to users.
    pub fn description(self) -> &'static str {
        match self {
            RouteLabel::Stockbroker => {
                "can fetch the price of a ticker, purchase/sell a ticker, or get the user's portfolio"
            }
            RouteLabel::TripPlanner => {
                "helps the user plan their trip. it can suggest restaurants, and places to stay in any given location."
            }
            RouteLabel::GeneralInput => {
                "handles all other cases where the above tools don't apply"
            }
        }
    }

    /// The non-catch-all routes, in declaration order.
    pub fn specialized() -> impl Iterator<Item = RouteLabel> {
        Self::ALL.into_iter().filter(|r| !r.is_catch_all())
    }
}

impl fmt::Display for RouteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteLabel {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| RouteError::InvalidRoute(s.to_string()))
    }
}

/// The classifier's output for one turn.
///
/// Produced once, stored on the state as `next_route`, then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterDecision {
    pub route: RouteLabel,
}

impl From<RouteLabel> for RouterDecision {
    fn from(route: RouteLabel) -> Self {
        Self { route }
    }
}
