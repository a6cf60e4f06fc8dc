pub mod classify;
pub mod init;
pub mod routes;
pub mod run;

use std::sync::Arc;

use switchyard_config::{AppConfig, OracleTarget};
use switchyard_core::RouteLabel;
use switchyard_core::provider::Provider;
use switchyard_providers::ProviderRegistry;
use switchyard_router::{DispatchGraph, GeneralInputHandler, IntentClassifier, SpecialistHandler};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load config and fail early, with setup hints, when no API key is set.
pub fn load_config() -> CliResult<AppConfig> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Default provider '{}' has no key. Set one of:", config.default_provider);
        eprintln!("    SWITCHYARD_API_KEY   (generic, any provider)");
        eprintln!("    OPENAI_API_KEY       (openai only)");
        eprintln!("    OPENROUTER_API_KEY   (openrouter only)");
        eprintln!("    ANTHROPIC_API_KEY    (anthropic only)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(config)
}

fn provider_for(registry: &ProviderRegistry, target: &OracleTarget) -> CliResult<Arc<dyn Provider>> {
    registry
        .get(&target.provider)
        .ok_or_else(|| format!("Provider '{}' is not configured", target.provider).into())
}

pub fn build_classifier(config: &AppConfig, registry: &ProviderRegistry) -> CliResult<IntentClassifier> {
    let target = config.classifier_target();
    Ok(IntentClassifier::new(provider_for(registry, &target)?, target.model)
        .with_max_tokens(config.classifier.max_tokens))
}

/// Wire the full graph: classifier, one specialist per specialized route,
/// and the fallback.
pub fn build_graph(config: &AppConfig, registry: &ProviderRegistry) -> CliResult<DispatchGraph> {
    let mut builder = DispatchGraph::builder()
        .name(&config.graph_name)
        .classifier(build_classifier(config, registry)?);

    for route in RouteLabel::specialized() {
        let settings = config.specialist(route);
        let target = config.specialist_target(route);
        let handler = SpecialistHandler::new(route, provider_for(registry, &target)?, target.model)
            .with_temperature(settings.temperature)
            .with_system_prompt(settings.system_prompt);
        builder = builder.route(route, Arc::new(handler));
    }

    let target = config.general_input_target();
    let fallback = GeneralInputHandler::new(provider_for(registry, &target)?, target.model)
        .with_max_tokens(config.general_input.max_tokens);

    Ok(builder.fallback(fallback).build()?)
}
