//! Provider registry — builds providers from config and hands them out by name.
//!
//! The classifier, the fallback handler, and each specialist may target a
//! different provider; the registry makes sure each named provider is
//! constructed once and shared.

use std::collections::HashMap;
use std::sync::Arc;
use switchyard_config::AppConfig;
use switchyard_core::provider::Provider;
use tracing::debug;

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Named providers with a default.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRegistry {
    /// Create an empty registry with a default provider name.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default_provider(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
///
/// Every provider named in `[providers]`, the default provider, and any
/// provider referenced by the classifier, fallback, or a specialist is
/// registered.
pub fn build_from_config(config: &AppConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new(&config.default_provider);

    let mut names: Vec<String> = config.providers.keys().cloned().collect();
    names.push(config.default_provider.clone());
    names.push(config.classifier_target().provider);
    names.push(config.general_input_target().provider);
    for route in switchyard_core::RouteLabel::specialized() {
        names.push(config.specialist_target(route).provider);
    }
    names.sort();
    names.dedup();

    for name in names {
        let provider_config = config.providers.get(&name);
        let api_key = config.api_key_for(&name).unwrap_or_default();
        let api_url = provider_config.and_then(|p| p.api_url.clone());

        let provider: Arc<dyn Provider> = if name == "anthropic" {
            let mut p = AnthropicProvider::new(&api_key);
            if let Some(url) = api_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        } else {
            let base_url = api_url.unwrap_or_else(|| default_base_url(&name));
            Arc::new(OpenAiCompatProvider::new(&name, base_url, &api_key))
        };

        debug!(provider = %name, "Registered provider");
        registry.register(name, provider);
    }

    registry
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "anthropic" => "https://api.anthropic.com".into(),
        "google" | "gemini" => "https://generativelanguage.googleapis.com/v1beta/openai".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
