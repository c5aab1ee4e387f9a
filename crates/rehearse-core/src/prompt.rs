//! Prompt construction.
//!
//! The question formats below are what the extractor parses, so they are
//! part of the wire contract with the generator and must not drift.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::QuestionKind;
use crate::report::Report;

/// Per-question layout the generator must follow for multiple choice.
pub const MCQ_FORMAT: &str =
    "Question: <text>\nA) ...\nB) ...\nC) ...\nD) ...\nCorrect: <A|B|C|D>";

/// Per-question layout the generator must follow for theory questions.
pub const THEORY_FORMAT: &str = "Question: <text>\nModel Answer: <text>";

/// What the user asked to practise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
    pub count: u32,
    pub kind: QuestionKind,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>, count: u32, kind: QuestionKind) -> Self {
        Self {
            topic: topic.into(),
            count,
            kind,
        }
    }
}

/// Build the question-generation prompt for a request.
pub fn build_prompt(request: &QuizRequest) -> String {
    let (description, format) = match request.kind {
        QuestionKind::Mcq => ("multiple-choice", MCQ_FORMAT),
        QuestionKind::Theory => ("theoretical", THEORY_FORMAT),
    };

    format!(
        "Generate {count} {description} technical interview questions about {topic}.\n\
         Repeat the following format for every question, with no other text:\n\n\
         {format}\n",
        count = request.count,
        topic = request.topic.trim(),
    )
}

/// Build the prompt asking the judge to grade a free-text answer.
///
/// The judge's reply must start with `Correct` or `Incorrect`; see
/// [`crate::evaluation::parse_verdict`].
pub fn build_evaluation_prompt(question: &str, model_answer: &str, candidate_answer: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are grading an answer given in a technical interview.\n\n");
    prompt.push_str(&format!("Question: {}\n", question.trim()));
    if !model_answer.trim().is_empty() {
        prompt.push_str(&format!("Reference answer: {}\n", model_answer.trim()));
    }
    prompt.push_str(&format!("Candidate answer: {}\n\n", candidate_answer.trim()));
    prompt.push_str(
        "Begin your reply with exactly one word, Correct or Incorrect, \
         then give one or two sentences of feedback.",
    );
    prompt
}

/// Build the prompt asking for a short study plan from a report.
pub fn build_analysis_prompt(report: &Report) -> Result<String> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    Ok(format!(
        "Here is a candidate's interview practice report as JSON:\n\n{json}\n\n\
         Write a short study plan. Focus on the weak areas and the recommended \
         focus list, lowest mastery first. Keep it under 200 words."
    ))
}
