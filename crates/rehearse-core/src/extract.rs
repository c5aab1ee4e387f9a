//! Structured extraction of questions from generated text.
//!
//! The generator's output format is not guaranteed, so extraction is
//! lenient: every non-blank segment yields exactly one question, and a
//! malformed segment degrades to a partially populated record instead of
//! failing the batch. Nothing in this module returns an error.

use crate::model::{McqQuestion, OptionLabel, Question, QuestionKind, TheoryQuestion};

/// Marker that starts every question in the generated text.
pub const QUESTION_DELIMITER: &str = "Question: ";

/// Marker that separates a theory question from its reference answer.
pub const MODEL_ANSWER_DELIMITER: &str = "Model Answer:";

/// Prefix of the line carrying the correct option of an MCQ question.
pub const CORRECT_PREFIX: &str = "Correct:";

/// Number of option lines read after the question line.
pub const OPTION_COUNT: usize = 4;

/// Extract questions of the given kind from a raw generation response.
pub fn extract(raw: &str, kind: QuestionKind) -> Vec<Question> {
    segments(raw)
        .map(|segment| match kind {
            QuestionKind::Mcq => Question::Mcq(parse_mcq(segment)),
            QuestionKind::Theory => Question::Theory(parse_theory(segment)),
        })
        .collect()
}

/// Split raw text into question segments.
///
/// Text before the first delimiter is preamble and is dropped, as is any
/// segment that is blank.
pub fn segments(raw: &str) -> impl Iterator<Item = &str> {
    let mut parts = raw.split(QUESTION_DELIMITER);
    if let Some(preamble) = parts.next() {
        if !preamble.trim().is_empty() {
            tracing::debug!(len = preamble.len(), "dropping preamble before first question");
        }
    }
    parts.filter(|segment| !segment.trim().is_empty())
}

/// Parse one multiple-choice segment.
///
/// Line 0 is the question, lines 1..=4 are taken verbatim as options, and
/// the first line starting with `Correct:` supplies the answer label.
pub fn parse_mcq(segment: &str) -> McqQuestion {
    let lines: Vec<&str> = segment
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let text = lines.first().copied().unwrap_or_default().to_string();
    let options: Vec<String> = lines
        .iter()
        .skip(1)
        .take(OPTION_COUNT)
        .map(|line| line.to_string())
        .collect();

    let marked = lines
        .iter()
        .find(|line| line.starts_with(CORRECT_PREFIX))
        .and_then(|line| line.split_once(':'))
        .map(|(_, rest)| rest.trim());

    let correct = match marked {
        Some(raw_label) => match OptionLabel::parse_lenient(raw_label) {
            Some(label) if label.index() < options.len() => Some(label),
            Some(label) => {
                tracing::debug!(%label, options = options.len(), "correct label has no matching option");
                None
            }
            None => {
                tracing::debug!(raw_label, "unrecognised correct label");
                None
            }
        },
        None => {
            tracing::debug!(question = %text, "no Correct: line in segment");
            None
        }
    };

    if options.len() < OPTION_COUNT {
        tracing::debug!(question = %text, options = options.len(), "short option list");
    }

    McqQuestion {
        text,
        options,
        correct,
    }
}

/// Parse one theory segment.
///
/// Everything before the first `Model Answer:` is the question; everything
/// after it, including any later occurrences of the marker, is the answer.
pub fn parse_theory(segment: &str) -> TheoryQuestion {
    match segment.split_once(MODEL_ANSWER_DELIMITER) {
        Some((text, answer)) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                tracing::debug!("theory segment has an empty question");
            }
            TheoryQuestion {
                text,
                model_answer: answer.trim().to_string(),
            }
        }
        None => {
            tracing::debug!("no Model Answer: marker in segment");
            TheoryQuestion {
                text: segment.trim().to_string(),
                model_answer: String::new(),
            }
        }
    }
}
