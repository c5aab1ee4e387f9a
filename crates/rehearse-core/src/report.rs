//! Mastery report types with JSON persistence.
//!
//! The report is a pure snapshot of [`MasteryState`]. Field names are
//! camelCase and form a fixed schema for whatever presents the report.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mastery::{round2, FocusItem, FocusKind, MasteryState, MasteryTracker, Tally};
use crate::model::AnswerEvent;

/// A percentage rounded to two decimals, or "no data" when nothing was
/// answered yet.
///
/// Serialized as a string such as `"66.67"`, or `null` for no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Option<String>", try_from = "Option<String>")]
pub struct Percentage(Option<f64>);

impl Percentage {
    /// `correct / total * 100`, or no data when `total` is zero.
    pub fn from_counts(correct: u32, total: u32) -> Self {
        Self::from_tally(Tally { correct, total })
    }

    pub fn from_tally(tally: Tally) -> Self {
        Percentage(tally.ratio().map(|r| round2(r * 100.0)))
    }

    pub fn value(self) -> Option<f64> {
        self.0
    }

    pub fn is_no_data(self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.2}%"),
            None => write!(f, "n/a"),
        }
    }
}

impl From<Percentage> for Option<String> {
    fn from(p: Percentage) -> Self {
        p.0.map(|v| format!("{v:.2}"))
    }
}

impl TryFrom<Option<String>> for Percentage {
    type Error = String;

    fn try_from(value: Option<String>) -> std::result::Result<Self, Self::Error> {
        match value {
            None => Ok(Percentage(None)),
            Some(s) => s
                .trim()
                .parse::<f64>()
                .map(|v| Percentage(Some(v)))
                .map_err(|e| format!("invalid percentage '{s}': {e}")),
        }
    }
}

/// Snapshot of all mastery statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub overall: OverallReport,
    pub topic_wise: BTreeMap<String, TopicReport>,
    pub concept_mastery: BTreeMap<String, ConceptReport>,
    pub weak_areas: Vec<String>,
    pub recommended_focus: Vec<FocusItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallReport {
    pub correct: u32,
    pub total: u32,
    pub percentage: Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicReport {
    pub correct: u32,
    pub total: u32,
    pub percentage: Percentage,
    /// Weak concepts for this topic; treat as a set.
    pub weak_areas: Vec<String>,
    pub average_time_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptReport {
    pub correct: u32,
    pub total: u32,
    pub percentage: Percentage,
}

impl Report {
    /// Build a report from tracker state.
    pub fn from_state(state: &MasteryState) -> Self {
        let topic_wise = state
            .topics()
            .iter()
            .map(|(topic, stats)| {
                (
                    topic.clone(),
                    TopicReport {
                        correct: stats.tally.correct,
                        total: stats.tally.total,
                        percentage: Percentage::from_tally(stats.tally),
                        weak_areas: stats.weak_concepts.iter().cloned().collect(),
                        average_time_seconds: stats.average_time_seconds,
                    },
                )
            })
            .collect();

        let concept_mastery = state
            .concepts()
            .iter()
            .map(|(concept, stats)| {
                (
                    concept.clone(),
                    ConceptReport {
                        correct: stats.correct,
                        total: stats.total,
                        percentage: Percentage::from_tally(*stats),
                    },
                )
            })
            .collect();

        Report {
            overall: OverallReport {
                correct: state.correct_answers(),
                total: state.total_questions(),
                percentage: Percentage::from_counts(
                    state.correct_answers(),
                    state.total_questions(),
                ),
            },
            topic_wise,
            concept_mastery,
            weak_areas: state.weak_areas().iter().cloned().collect(),
            recommended_focus: state.recommended_focus(),
        }
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Overall:** {}/{} correct ({})\n\n",
            self.overall.correct, self.overall.total, self.overall.percentage
        ));

        if !self.topic_wise.is_empty() {
            md.push_str("### Topics\n\n");
            md.push_str("| Topic | Correct | Total | Score | Avg time | Weak concepts |\n");
            md.push_str("|-------|---------|-------|-------|----------|---------------|\n");
            for (topic, t) in &self.topic_wise {
                let avg = t
                    .average_time_seconds
                    .map(|s| format!("{s:.2}s"))
                    .unwrap_or_else(|| "-".to_string());
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    topic,
                    t.correct,
                    t.total,
                    t.percentage,
                    avg,
                    t.weak_areas.join(", ")
                ));
            }
            md.push('\n');
        }

        if !self.concept_mastery.is_empty() {
            md.push_str("### Concepts\n\n");
            md.push_str("| Concept | Correct | Total | Mastery |\n");
            md.push_str("|---------|---------|-------|---------|\n");
            for (concept, c) in &self.concept_mastery {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    concept, c.correct, c.total, c.percentage
                ));
            }
            md.push('\n');
        }

        if !self.weak_areas.is_empty() {
            md.push_str(&format!("**Weak areas:** {}\n\n", self.weak_areas.join(", ")));
        }

        if !self.recommended_focus.is_empty() {
            md.push_str("### Recommended focus\n\n");
            for item in &self.recommended_focus {
                let label = match item.kind {
                    FocusKind::Weak => "weak",
                    FocusKind::Practice => "practice",
                };
                md.push_str(&format!(
                    "- {} ({label}, {})\n",
                    item.concept, item.mastery_percentage
                ));
            }
        }

        md
    }
}

/// A finished practice session, exported for later rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Unique session identifier.
    pub id: Uuid,
    /// When the session was saved.
    pub created_at: DateTime<Utc>,
    pub report: Report,
    /// Every recorded answer, in order.
    pub history: Vec<AnswerEvent>,
}

impl SessionRecord {
    pub fn from_tracker(tracker: &MasteryTracker) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            report: tracker.build_report(),
            history: tracker.history().to_vec(),
        }
    }

    /// Save the session as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize session")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write session to {}", path.display()))?;
        Ok(())
    }

    /// Load a session from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session from {}", path.display()))?;
        let session: SessionRecord =
            serde_json::from_str(&content).context("failed to parse session JSON")?;
        Ok(session)
    }
}
