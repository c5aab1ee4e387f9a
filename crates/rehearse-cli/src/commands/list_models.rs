//! The `rehearse list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use rehearse_core::traits::ModelInfo;
use rehearse_providers::config::{create_provider, load_config_from, ProviderConfig};
use rehearse_providers::ollama::OllamaProvider;

pub async fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut found_any = false;

    for (name, provider_config) in &config.providers {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }

        let models: Vec<ModelInfo> = match provider_config {
            ProviderConfig::Ollama { base_url } => {
                match OllamaProvider::new(base_url)?.list_models_async().await {
                    Ok(models) => models,
                    Err(e) => {
                        eprintln!("  {name}: {e:#}");
                        continue;
                    }
                }
            }
            other => match create_provider(other) {
                Ok(provider) => provider.available_models(),
                Err(e) => {
                    eprintln!("  {name}: {e:#}");
                    continue;
                }
            },
        };

        if models.is_empty() {
            continue;
        }
        found_any = true;
        println!("Provider: {name}");
        for model in &models {
            if model.max_context > 0 {
                println!(
                    "  {name}/{} ({}, {}K context, ${:.4}/{:.4} per 1K tokens)",
                    model.id,
                    model.name,
                    model.max_context / 1000,
                    model.cost_per_1k_input,
                    model.cost_per_1k_output,
                );
            } else {
                println!("  {name}/{}", model.id);
            }
        }
        println!();
    }

    if !found_any {
        println!("No providers configured. Run `rehearse init` to create a config file.");
    }

    Ok(())
}
