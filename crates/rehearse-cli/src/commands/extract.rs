//! The `rehearse extract` command.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use rehearse_core::extract::extract;
use rehearse_core::model::QuestionKind;

pub fn execute(input: PathBuf, kind: QuestionKind) -> Result<()> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(&input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };

    let questions = extract(&raw, kind);
    if questions.is_empty() {
        tracing::warn!("no questions found; is the response in the expected format?");
    }
    println!("{}", serde_json::to_string_pretty(&questions)?);
    Ok(())
}
