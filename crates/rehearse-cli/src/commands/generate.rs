//! The `rehearse generate` command.

use std::path::PathBuf;

use anyhow::Result;

use rehearse_core::model::QuestionKind;
use rehearse_core::prompt::QuizRequest;

pub async fn execute(
    topic: String,
    count: Option<u32>,
    kind: QuestionKind,
    model: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(!topic.trim().is_empty(), "topic must not be empty");
    let (config, engine) = super::build_engine(config_path.as_deref(), model.as_deref())?;
    let request = QuizRequest::new(topic.trim(), super::question_count(count, &config)?, kind);

    let questions = engine.generate_questions(&request).await?;
    println!("{}", serde_json::to_string_pretty(&questions)?);
    Ok(())
}
