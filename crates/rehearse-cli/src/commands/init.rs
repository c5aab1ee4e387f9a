//! The `rehearse init` command.

use std::path::Path;

use anyhow::{Context, Result};

use rehearse_providers::config::{LOCAL_CONFIG_FILE, STARTER_CONFIG};

pub fn execute() -> Result<()> {
    let path = Path::new(LOCAL_CONFIG_FILE);
    if path.exists() {
        println!("{LOCAL_CONFIG_FILE} already exists, skipping.");
        return Ok(());
    }

    std::fs::write(path, STARTER_CONFIG)
        .with_context(|| format!("failed to write {LOCAL_CONFIG_FILE}"))?;
    println!("Created {LOCAL_CONFIG_FILE}");

    println!("\nNext steps:");
    println!("  1. Export ANTHROPIC_API_KEY or OPENAI_API_KEY, or point it at Ollama");
    println!("  2. Run: rehearse practice --topic \"Rust ownership\" --kind mcq");
    println!("  3. Run: rehearse report --session <saved session>.json");

    Ok(())
}
