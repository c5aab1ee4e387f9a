//! Fixed-vocabulary concept tagging.
//!
//! A question is tagged with every vocabulary keyword that appears in it as
//! a whole whitespace-separated token. Matching is case-insensitive but
//! otherwise exact: `"function?"` and `"functional"` are both different
//! tokens from `function`. Paraphrases are missed.

use std::collections::BTreeSet;

/// Keywords recognised out of the box.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "algorithm",
    "api",
    "array",
    "async",
    "await",
    "cache",
    "callback",
    "class",
    "concurrency",
    "database",
    "function",
    "graph",
    "hash",
    "heap",
    "http",
    "index",
    "inheritance",
    "interface",
    "list",
    "memory",
    "mutex",
    "object",
    "pointer",
    "promise",
    "query",
    "queue",
    "recursion",
    "rest",
    "search",
    "security",
    "sorting",
    "sql",
    "stack",
    "string",
    "testing",
    "thread",
    "transaction",
    "tree",
];

/// Tags question text with concepts from a configurable vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptTagger {
    vocabulary: BTreeSet<String>,
}

impl Default for ConceptTagger {
    fn default() -> Self {
        Self::with_vocabulary(DEFAULT_VOCABULARY.iter().copied())
    }
}

impl ConceptTagger {
    /// Build a tagger over a custom keyword list.
    ///
    /// Keywords are lower-cased; blank entries and entries containing
    /// whitespace (which could never match a single token) are ignored.
    pub fn with_vocabulary<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vocabulary = keywords
            .into_iter()
            .filter_map(|k| {
                let k = k.as_ref().trim().to_lowercase();
                if k.is_empty() || k.contains(char::is_whitespace) {
                    tracing::warn!(keyword = %k, "ignoring unusable concept keyword");
                    None
                } else {
                    Some(k)
                }
            })
            .collect();
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.iter().map(String::as_str)
    }

    /// Return the set of vocabulary keywords present in `text`.
    pub fn tag(&self, text: &str) -> BTreeSet<String> {
        text.to_lowercase()
            .split_whitespace()
            .filter(|token| self.vocabulary.contains(*token))
            .map(str::to_string)
            .collect()
    }
}

/// Tag `text` with the default vocabulary.
pub fn tag_concepts(text: &str) -> BTreeSet<String> {
    ConceptTagger::default().tag(text)
}
