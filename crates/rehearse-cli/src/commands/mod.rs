//! Subcommand implementations.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use rehearse_core::engine::{EngineConfig, RehearsalEngine};
use rehearse_core::mastery::MasteryTracker;
use rehearse_providers::config::{load_config_from, RehearseConfig};

pub mod extract;
pub mod generate;
pub mod init;
pub mod list_models;
pub mod practice;
pub mod report;

/// Largest batch a single round may request.
const MAX_COUNT: u32 = 50;

/// Resolve `--count` against the config and check its range.
fn question_count(count: Option<u32>, config: &RehearseConfig) -> Result<u32> {
    let count = count.unwrap_or(config.question_count);
    anyhow::ensure!(
        (1..=MAX_COUNT).contains(&count),
        "count must be between 1 and {MAX_COUNT}, got {count}"
    );
    Ok(count)
}

/// Load config and build an engine for `--model` (or the configured default).
fn build_engine(
    config_path: Option<&Path>,
    model: Option<&str>,
) -> Result<(RehearseConfig, RehearsalEngine)> {
    let config = load_config_from(config_path)?;
    anyhow::ensure!(
        (0.0..=2.0).contains(&config.default_temperature),
        "default_temperature must be between 0.0 and 2.0"
    );

    let (provider_name, model) = config.resolve_model(model);
    let provider = config.provider(&provider_name)?;
    tracing::info!(provider = %provider_name, model = %model, "using model");

    let engine_config = EngineConfig {
        model,
        temperature: config.default_temperature,
        max_tokens: config.max_tokens,
        system_prompt_override: None,
        evaluation_timeout: (config.evaluation_timeout_secs > 0)
            .then(|| Duration::from_secs(config.evaluation_timeout_secs)),
    };
    let engine = RehearsalEngine::new(
        provider,
        MasteryTracker::with_tagger(config.tagger()),
        engine_config,
    );
    Ok((config, engine))
}
