//! Single-turn intent routing.
//!
//! One run takes the conversation so far, classifies the latest human
//! message into a [`RouteLabel`](switchyard_core::RouteLabel), and executes
//! exactly one handler for that route:
//!
//! ```text
//!   START
//!     │
//!     ▼
//! ┌────────┐   forced single-choice oracle call
//! │ router │
//! └─┬──┬──┬┘
//!   │  │  └───────────────┐
//!   ▼  ▼                  ▼
//! stockbroker  tripPlanner  generalInput   ← exactly one runs
//!   │  │                  │
//!   └──┴──────┬───────────┘
//!             ▼
//!            END
//! ```
//!
//! The classifier and the built-in handlers receive their oracle as an
//! `Arc<dyn Provider>`, so tests can drive the whole graph with scripted
//! doubles.

pub mod classifier;
pub mod fallback;
pub mod graph;
pub mod prompts;
pub mod specialist;

pub use classifier::IntentClassifier;
pub use fallback::GeneralInputHandler;
pub use graph::{DispatchGraph, DispatchGraphBuilder, GraphBuildError, GraphNode, GraphRun, next_node};
pub use specialist::SpecialistHandler;

#[cfg(test)]
pub(crate) mod test_helpers;
