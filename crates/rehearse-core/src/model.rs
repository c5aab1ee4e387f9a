//! Core data model types for rehearse.
//!
//! Questions are immutable once extracted. Degraded extraction shows up as
//! typed absence (`correct: None`, short `options`, empty `model_answer`)
//! rather than as an error.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two question formats the generator is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Mcq,
    Theory,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Mcq => write!(f, "mcq"),
            QuestionKind::Theory => write!(f, "theory"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mcq" | "multiple-choice" | "choice" => Ok(QuestionKind::Mcq),
            "theory" | "theoretical" | "open" => Ok(QuestionKind::Theory),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// Label of a multiple-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    /// Zero-based position of this label in an option list.
    pub fn index(self) -> usize {
        match self {
            OptionLabel::A => 0,
            OptionLabel::B => 1,
            OptionLabel::C => 2,
            OptionLabel::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Read a label from free text such as `"B"`, `"b)"` or `"C. Stack"`.
    ///
    /// Only the first character is considered, and it must not run into
    /// another letter or digit (`"Both"` is not a label).
    pub fn parse_lenient(text: &str) -> Option<Self> {
        let mut chars = text.trim().chars();
        let first = chars.next()?;
        if chars.next().is_some_and(|c| c.is_alphanumeric()) {
            return None;
        }
        match first.to_ascii_uppercase() {
            'A' => Some(OptionLabel::A),
            'B' => Some(OptionLabel::B),
            'C' => Some(OptionLabel::C),
            'D' => Some(OptionLabel::D),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            OptionLabel::A => 'A',
            OptionLabel::B => 'B',
            OptionLabel::C => 'C',
            OptionLabel::D => 'D',
        };
        write!(f, "{c}")
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    /// Question text (first line of the segment).
    pub text: String,
    /// Option lines as they appeared, prefixes included. Usually four.
    pub options: Vec<String>,
    /// The marked answer, if the generator supplied a usable one.
    #[serde(rename = "correctLabel")]
    pub correct: Option<OptionLabel>,
}

/// An open-ended question with a reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheoryQuestion {
    pub text: String,
    /// Reference answer; empty when the generator omitted it.
    pub model_answer: String,
}

/// A question extracted from generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Question {
    Mcq(McqQuestion),
    Theory(TheoryQuestion),
}

impl Question {
    pub fn text(&self) -> &str {
        match self {
            Question::Mcq(q) => &q.text,
            Question::Theory(q) => &q.text,
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::Mcq(_) => QuestionKind::Mcq,
            Question::Theory(_) => QuestionKind::Theory,
        }
    }
}

/// One recorded response. Append-only within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvent {
    pub topic: String,
    pub question_text: String,
    pub is_correct: bool,
    /// Feedback text produced by whoever judged the answer.
    pub evaluation_text: String,
    #[serde(default)]
    pub time_taken_seconds: Option<f64>,
    pub concepts: BTreeSet<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_and_parse() {
        assert_eq!(QuestionKind::Mcq.to_string(), "mcq");
        assert_eq!("Theory".parse::<QuestionKind>().unwrap(), QuestionKind::Theory);
        assert_eq!(
            "multiple-choice".parse::<QuestionKind>().unwrap(),
            QuestionKind::Mcq
        );
        assert!("essay".parse::<QuestionKind>().is_err());
    }

    #[test]
    fn lenient_label_parsing() {
        assert_eq!(OptionLabel::parse_lenient("B"), Some(OptionLabel::B));
        assert_eq!(OptionLabel::parse_lenient(" c) "), Some(OptionLabel::C));
        assert_eq!(OptionLabel::parse_lenient("D. heap"), Some(OptionLabel::D));
        assert_eq!(OptionLabel::parse_lenient("Both"), None);
        assert_eq!(OptionLabel::parse_lenient("E"), None);
        assert_eq!(OptionLabel::parse_lenient(""), None);
    }

    #[test]
    fn label_index_roundtrip() {
        for label in OptionLabel::ALL {
            assert_eq!(OptionLabel::from_index(label.index()), Some(label));
        }
        assert_eq!(OptionLabel::from_index(4), None);
    }

    #[test]
    fn question_serializes_with_kind_tag() {
        let q = Question::Theory(TheoryQuestion {
            text: "What is a mutex?".into(),
            model_answer: "A lock.".into(),
        });
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["kind"], "theory");
        assert_eq!(json["modelAnswer"], "A lock.");
    }
}
