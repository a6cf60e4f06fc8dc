//! LLM Provider implementations for Switchyard.
//!
//! All providers implement the `switchyard_core::Provider` trait.
//! The registry builds them from configuration and hands them out by name.

pub mod anthropic;
pub mod openai_compat;
pub mod registry;

pub use anthropic::AnthropicProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use registry::{ProviderRegistry, build_from_config};
