//! Adaptive mastery tracking.
//!
//! Aggregates per-answer outcomes into overall, per-topic and per-concept
//! statistics, maintains the weak-area set, and ranks concepts to focus on.
//! All state lives in one [`MasteryTracker`] for the duration of a run.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::concepts::ConceptTagger;
use crate::model::AnswerEvent;
use crate::report::{Percentage, Report};

/// A concept whose global ratio falls below this after a wrong answer
/// becomes a weak area.
pub const WEAK_AREA_THRESHOLD: f64 = 0.70;

/// Weak areas below this ratio are recommended as `weak`.
pub const WEAK_FOCUS_THRESHOLD: f64 = 0.60;

/// Concepts outside the weak-area set below this ratio are recommended
/// as `practice`.
pub const PRACTICE_FOCUS_THRESHOLD: f64 = 0.80;

/// Correct/total counters. `correct <= total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    /// `correct / total`, or `None` before the first answer.
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }
}

/// Per-concept counters.
pub type ConceptStats = Tally;

/// Statistics for one topic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicStats {
    pub tally: Tally,
    /// Concepts marked weak while answering this topic. Never shrinks.
    pub weak_concepts: BTreeSet<String>,
    /// Concept counters restricted to this topic.
    pub concept_counts: BTreeMap<String, ConceptStats>,
    /// Mean answer time in seconds, rounded to two decimals.
    pub average_time_seconds: Option<f64>,
}

/// Everything the tracker knows about the current run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasteryState {
    pub(crate) overall: Tally,
    pub(crate) topics: BTreeMap<String, TopicStats>,
    pub(crate) concepts: BTreeMap<String, ConceptStats>,
    pub(crate) weak_areas: BTreeSet<String>,
    pub(crate) time_samples: BTreeMap<String, Vec<f64>>,
    pub(crate) history: Vec<AnswerEvent>,
}

impl MasteryState {
    pub fn correct_answers(&self) -> u32 {
        self.overall.correct
    }

    pub fn total_questions(&self) -> u32 {
        self.overall.total
    }

    pub fn topics(&self) -> &BTreeMap<String, TopicStats> {
        &self.topics
    }

    pub fn concepts(&self) -> &BTreeMap<String, ConceptStats> {
        &self.concepts
    }

    pub fn weak_areas(&self) -> &BTreeSet<String> {
        &self.weak_areas
    }

    pub fn time_samples(&self, topic: &str) -> &[f64] {
        self.time_samples
            .get(topic)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn history(&self) -> &[AnswerEvent] {
        &self.history
    }

    /// Rank concepts that need attention, lowest mastery first.
    ///
    /// Weak areas under [`WEAK_FOCUS_THRESHOLD`] are `weak`; other concepts
    /// under [`PRACTICE_FOCUS_THRESHOLD`] are `practice`. A weak area that
    /// has recovered to at least the weak-focus threshold is left out.
    pub fn recommended_focus(&self) -> Vec<FocusItem> {
        let mut ranked: Vec<(f64, FocusItem)> = self
            .concepts
            .iter()
            .filter_map(|(concept, stats)| {
                let ratio = stats.ratio()?;
                let kind = if self.weak_areas.contains(concept) {
                    (ratio < WEAK_FOCUS_THRESHOLD).then_some(FocusKind::Weak)?
                } else {
                    (ratio < PRACTICE_FOCUS_THRESHOLD).then_some(FocusKind::Practice)?
                };
                let item = FocusItem {
                    concept: concept.clone(),
                    kind,
                    mastery_percentage: Percentage::from_tally(*stats),
                };
                Some((ratio, item))
            })
            .collect();

        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.into_iter().map(|(_, item)| item).collect()
    }
}

/// Why a concept is recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusKind {
    Weak,
    Practice,
}

/// One entry of the recommended-focus ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusItem {
    pub concept: String,
    pub kind: FocusKind,
    /// Serialized like every other report percentage, e.g. `"25.00"`.
    pub mastery_percentage: Percentage,
}

/// Owns the mastery state for one session.
#[derive(Debug, Clone, Default)]
pub struct MasteryTracker {
    tagger: ConceptTagger,
    state: MasteryState,
}

impl MasteryTracker {
    /// Create a tracker using the default concept vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with a custom concept tagger.
    pub fn with_tagger(tagger: ConceptTagger) -> Self {
        Self {
            tagger,
            state: MasteryState::default(),
        }
    }

    pub fn tagger(&self) -> &ConceptTagger {
        &self.tagger
    }

    pub fn state(&self) -> &MasteryState {
        &self.state
    }

    pub fn history(&self) -> &[AnswerEvent] {
        &self.state.history
    }

    /// Record one answer and update every statistic it touches.
    ///
    /// A `time_taken_seconds` of zero counts as not provided, as do
    /// negative and non-finite values.
    pub fn record_answer(
        &mut self,
        topic: &str,
        question_text: &str,
        is_correct: bool,
        evaluation_text: &str,
        time_taken_seconds: Option<f64>,
    ) -> &AnswerEvent {
        let state = &mut self.state;
        state.overall.record(is_correct);

        let topic_stats = state.topics.entry(topic.to_string()).or_default();
        topic_stats.tally.record(is_correct);

        match time_taken_seconds {
            Some(secs) if secs.is_finite() && secs > 0.0 => {
                let samples = state.time_samples.entry(topic.to_string()).or_default();
                samples.push(secs);
                let mean = samples.iter().sum::<f64>() / samples.len() as f64;
                topic_stats.average_time_seconds = Some(round2(mean));
            }
            Some(secs) if secs != 0.0 => {
                tracing::warn!(topic, secs, "ignoring invalid answer time");
            }
            _ => {}
        }

        let concepts = self.tagger.tag(question_text);
        for concept in &concepts {
            state
                .concepts
                .entry(concept.clone())
                .or_default()
                .record(is_correct);
            topic_stats
                .concept_counts
                .entry(concept.clone())
                .or_default()
                .record(is_correct);
        }

        if !is_correct {
            for concept in &concepts {
                let below = state
                    .concepts
                    .get(concept)
                    .and_then(Tally::ratio)
                    .is_some_and(|ratio| ratio < WEAK_AREA_THRESHOLD);
                if below {
                    if state.weak_areas.insert(concept.clone()) {
                        tracing::info!(concept = %concept, topic, "concept marked as weak area");
                    }
                    topic_stats.weak_concepts.insert(concept.clone());
                }
            }
        }

        state.history.push(AnswerEvent {
            topic: topic.to_string(),
            question_text: question_text.to_string(),
            is_correct,
            evaluation_text: evaluation_text.to_string(),
            time_taken_seconds,
            concepts,
            timestamp: Utc::now(),
        });

        &state.history[state.history.len() - 1]
    }

    /// Snapshot the current statistics. Has no side effects.
    pub fn build_report(&self) -> Report {
        Report::from_state(&self.state)
    }
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(tracker: &mut MasteryTracker, topic: &str, text: &str, ok: bool) {
        tracker.record_answer(topic, text, ok, if ok { "Correct." } else { "Incorrect." }, None);
    }

    fn assert_counts_consistent(state: &MasteryState) {
        assert!(state.correct_answers() <= state.total_questions());
        for stats in state.topics().values() {
            assert!(stats.tally.correct <= stats.tally.total);
            for c in stats.concept_counts.values() {
                assert!(c.correct <= c.total);
            }
        }
        for c in state.concepts().values() {
            assert!(c.correct <= c.total);
        }
    }

    #[test]
    fn counts_overall_topic_and_concepts() {
        let mut tracker = MasteryTracker::new();
        answer(&mut tracker, "Arrays", "Reverse an array in place", true);
        answer(&mut tracker, "Arrays", "Find a duplicate in an array", false);
        answer(&mut tracker, "Trees", "Invert a binary tree", true);

        let state = tracker.state();
        assert_eq!(state.total_questions(), 3);
        assert_eq!(state.correct_answers(), 2);
        assert_eq!(state.topics()["Arrays"].tally, Tally { correct: 1, total: 2 });
        assert_eq!(state.concepts()["array"], Tally { correct: 1, total: 2 });
        assert_eq!(
            state.topics()["Arrays"].concept_counts["array"],
            Tally { correct: 1, total: 2 }
        );
        assert!(!state.topics()["Trees"].concept_counts.contains_key("array"));
        assert_eq!(state.history().len(), 3);
        assert_counts_consistent(state);
    }

    #[test]
    fn wrong_answer_marks_weak_area() {
        let mut tracker = MasteryTracker::new();
        for _ in 0..3 {
            answer(&mut tracker, "JS", "What is a closure in a JS function scope?", false);
        }
        let state = tracker.state();
        assert_eq!(state.concepts()["function"], Tally { correct: 0, total: 3 });
        assert!(state.weak_areas().contains("function"));
        assert!(state.topics()["JS"].weak_concepts.contains("function"));
    }

    #[test]
    fn closure_question_has_no_concepts() {
        let mut tracker = MasteryTracker::new();
        let event = tracker.record_answer("JS", "What is a closure in JS?", false, "Incorrect.", None);
        assert!(event.concepts.is_empty());
        assert!(tracker.state().weak_areas().is_empty());
    }

    #[test]
    fn correct_answer_never_marks_weak() {
        let mut tracker = MasteryTracker::new();
        answer(&mut tracker, "Q", "stack basics", true);
        assert!(tracker.state().weak_areas().is_empty());

        answer(&mut tracker, "Q", "stack basics", false);
        // 1/2 = 0.5 after the miss
        assert!(tracker.state().weak_areas().contains("stack"));
    }

    #[test]
    fn wrong_answer_above_threshold_is_not_weak() {
        let mut tracker = MasteryTracker::new();
        for _ in 0..3 {
            answer(&mut tracker, "S", "sorting question", true);
        }
        answer(&mut tracker, "S", "sorting question", false);
        // 3/4 = 0.75 >= 0.70
        assert!(!tracker.state().weak_areas().contains("sorting"));
    }

    #[test]
    fn weak_area_uses_session_ratio_not_topic_ratio() {
        let mut tracker = MasteryTracker::new();
        for _ in 0..5 {
            answer(&mut tracker, "B", "sum an array", true);
        }
        answer(&mut tracker, "A", "sum an array", false);

        // 5/6 overall, even though A alone is 0/1
        let state = tracker.state();
        assert_eq!(state.topics()["A"].concept_counts["array"], Tally { correct: 0, total: 1 });
        assert!(!state.weak_areas().contains("array"));
        assert!(state.topics()["A"].weak_concepts.is_empty());
        assert!(state.topics()["B"].weak_concepts.is_empty());
    }

    #[test]
    fn low_session_ratio_marks_strong_topic() {
        let mut tracker = MasteryTracker::new();
        for _ in 0..3 {
            answer(&mut tracker, "B", "sum an array", false);
        }
        for _ in 0..9 {
            answer(&mut tracker, "A", "sum an array", true);
        }
        assert!(tracker.state().topics()["A"].weak_concepts.is_empty());

        answer(&mut tracker, "A", "sum an array", false);

        // 9/13 overall is under 0.70 while A alone is 9/10
        let state = tracker.state();
        assert_eq!(state.topics()["A"].concept_counts["array"], Tally { correct: 9, total: 10 });
        assert!(state.weak_areas().contains("array"));
        assert!(state.topics()["A"].weak_concepts.contains("array"));
        assert!(state.topics()["B"].weak_concepts.contains("array"));
    }

    #[test]
    fn weak_areas_are_monotonic() {
        let mut tracker = MasteryTracker::new();
        answer(&mut tracker, "Heaps", "heap insert", false);
        assert!(tracker.state().weak_areas().contains("heap"));
        for _ in 0..20 {
            answer(&mut tracker, "Heaps", "heap insert", true);
            assert!(tracker.state().weak_areas().contains("heap"));
        }
        assert!(tracker.state().topics()["Heaps"].weak_concepts.contains("heap"));
    }

    #[test]
    fn average_time_ignores_zero_and_invalid() {
        let mut tracker = MasteryTracker::new();
        tracker.record_answer("T", "q", true, "", Some(10.0));
        tracker.record_answer("T", "q", true, "", Some(0.0));
        tracker.record_answer("T", "q", true, "", Some(-3.0));
        tracker.record_answer("T", "q", true, "", Some(f64::NAN));
        tracker.record_answer("T", "q", true, "", Some(5.0));
        tracker.record_answer("T", "q", true, "", Some(5.0));

        let state = tracker.state();
        assert_eq!(state.time_samples("T"), &[10.0, 5.0, 5.0]);
        assert_eq!(state.topics()["T"].average_time_seconds, Some(6.67));
        assert_eq!(state.topics()["T"].tally.total, 6);
        assert!(state.time_samples("missing").is_empty());
    }

    #[test]
    fn topic_without_timings_has_no_average() {
        let mut tracker = MasteryTracker::new();
        answer(&mut tracker, "T", "q", true);
        assert_eq!(tracker.state().topics()["T"].average_time_seconds, None);
    }

    #[test]
    fn history_keeps_order_and_fields() {
        let mut tracker = MasteryTracker::new();
        tracker.record_answer("A", "first array", true, "Correct.", Some(2.5));
        tracker.record_answer("B", "second", false, "Incorrect, see docs.", None);

        let history = tracker.history();
        assert_eq!(history[0].question_text, "first array");
        assert_eq!(history[0].time_taken_seconds, Some(2.5));
        assert!(history[0].concepts.contains("array"));
        assert_eq!(history[1].evaluation_text, "Incorrect, see docs.");
        assert!(history[0].timestamp <= history[1].timestamp);
    }

    #[test]
    fn totals_never_decrease() {
        let mut tracker = MasteryTracker::new();
        let mut last = 0;
        for i in 0..25 {
            answer(&mut tracker, "Mixed", "array stack queue", i % 3 == 0);
            let total = tracker.build_report().overall.total;
            assert!(total > last);
            last = total;
            assert_counts_consistent(tracker.state());
        }
    }

    #[test]
    fn recommended_focus_thresholds() {
        let mut tracker = MasteryTracker::new();
        // "graph": weak, 1/4 = 25%
        answer(&mut tracker, "G", "graph", true);
        for _ in 0..3 {
            answer(&mut tracker, "G", "graph", false);
        }
        // "hash": weak area that recovered to 65%: omitted
        for _ in 0..7 {
            answer(&mut tracker, "H", "hash", false);
        }
        for _ in 0..13 {
            answer(&mut tracker, "H", "hash", true);
        }
        // "string": never weak (only correct answers then one miss at 75%): practice
        for _ in 0..3 {
            answer(&mut tracker, "S", "string", true);
        }
        answer(&mut tracker, "S", "string", false);
        // "tree": all correct: nothing
        answer(&mut tracker, "T", "tree", true);

        let state = tracker.state();
        assert!(state.weak_areas().contains("graph"));
        assert!(state.weak_areas().contains("hash"));
        assert!(!state.weak_areas().contains("string"));

        let focus = state.recommended_focus();
        assert_eq!(
            focus,
            vec![
                FocusItem {
                    concept: "graph".into(),
                    kind: FocusKind::Weak,
                    mastery_percentage: Percentage::from_counts(1, 4),
                },
                FocusItem {
                    concept: "string".into(),
                    kind: FocusKind::Practice,
                    mastery_percentage: Percentage::from_counts(3, 4),
                },
            ]
        );
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(2.0 / 3.0 * 100.0), 66.67);
        assert_eq!(round2(10.0), 10.0);
    }
}
