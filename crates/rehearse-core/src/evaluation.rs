//! Answer evaluation.
//!
//! Multiple-choice answers are checked locally against the marked option.
//! Theory answers are judged by the generation service; this module only
//! reads the verdict out of the judge's reply.

use serde::{Deserialize, Serialize};

use crate::model::{McqQuestion, OptionLabel};

/// Outcome of judging one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub is_correct: bool,
    /// Feedback shown to the user and stored on the answer event.
    pub text: String,
}

/// Check a multiple-choice response such as `"b"` or `"B) O(log n)"`.
///
/// Returns `None` when the question has no marked answer and therefore
/// cannot be scored.
pub fn evaluate_choice(question: &McqQuestion, response: &str) -> Option<Evaluation> {
    let correct = question.correct?;
    let expected = question
        .options
        .get(correct.index())
        .map(String::as_str)
        .unwrap_or_default();

    let evaluation = match OptionLabel::parse_lenient(response) {
        Some(chosen) if chosen == correct => Evaluation {
            is_correct: true,
            text: format!("Correct! {expected}"),
        },
        Some(chosen) => Evaluation {
            is_correct: false,
            text: format!("Incorrect. You chose {chosen}; the answer is {expected}"),
        },
        None => Evaluation {
            is_correct: false,
            text: format!("Incorrect. No option A-D recognised; the answer is {expected}"),
        },
    };
    Some(evaluation)
}

/// Read the verdict from a judge reply.
///
/// The reply is expected to start with `Correct` or `Incorrect`. Anything
/// else, including an empty reply, counts as incorrect.
pub fn parse_verdict(reply: &str) -> bool {
    reply
        .split_whitespace()
        .next()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .is_some_and(|word| word.eq_ignore_ascii_case("correct"))
}

/// Turn a judge reply into an [`Evaluation`].
pub fn evaluation_from_reply(reply: &str) -> Evaluation {
    Evaluation {
        is_correct: parse_verdict(reply),
        text: reply.trim().to_string(),
    }
}
