//! Rehearsal engine.
//!
//! Drives one practice round: ask the generator for questions, extract
//! them, present each to the candidate, evaluate the response and record
//! it in the mastery tracker. Everything runs sequentially; the only
//! suspension points are calls to the generation service.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::error::GenerationFailure;
use crate::evaluation::{evaluate_choice, evaluation_from_reply, Evaluation};
use crate::extract::extract;
use crate::mastery::MasteryTracker;
use crate::model::{AnswerEvent, Question, TheoryQuestion};
use crate::prompt::{build_analysis_prompt, build_evaluation_prompt, build_prompt, QuizRequest};
use crate::traits::{GenerateRequest, GenerationProvider};

/// Configuration for the rehearsal engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Temperature for question generation.
    pub temperature: f64,
    /// Max tokens per generation call.
    pub max_tokens: u32,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
    /// Bound on waiting for the judge; on expiry the question is skipped.
    pub evaluation_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            system_prompt_override: None,
            evaluation_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// What the candidate typed for one question.
#[derive(Debug, Clone, Default)]
pub struct CandidateResponse {
    pub answer: String,
    /// Time spent on the question, if measured.
    pub time_taken: Option<Duration>,
}

/// Source of answers, typically a person at a terminal.
pub trait Candidate {
    /// Present `question` (1-based `position` of `total`) and return the
    /// response. An error aborts the round.
    fn respond(
        &mut self,
        question: &Question,
        position: usize,
        total: usize,
    ) -> Result<CandidateResponse>;
}

/// Why a question was not scored.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The candidate gave an empty answer.
    NoAnswer,
    /// The question has no marked answer to compare against.
    Unscorable,
    /// The judge call failed.
    JudgeFailed(String),
    /// The judge did not answer within the configured bound.
    JudgeTimedOut(Duration),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoAnswer => write!(f, "no answer given"),
            SkipReason::Unscorable => write!(f, "question has no marked answer"),
            SkipReason::JudgeFailed(e) => write!(f, "evaluation failed: {e}"),
            SkipReason::JudgeTimedOut(d) => {
                write!(f, "evaluation timed out after {}s", d.as_secs())
            }
        }
    }
}

/// Round progress callbacks.
pub trait RoundObserver {
    fn on_questions_ready(&self, request: &QuizRequest, count: usize);
    fn on_answer_recorded(&self, question: &Question, event: &AnswerEvent);
    fn on_question_skipped(&self, question: &Question, reason: &SkipReason);
}

/// No-op round observer.
pub struct NoopObserver;

impl RoundObserver for NoopObserver {
    fn on_questions_ready(&self, _: &QuizRequest, _: usize) {}
    fn on_answer_recorded(&self, _: &Question, _: &AnswerEvent) {}
    fn on_question_skipped(&self, _: &Question, _: &SkipReason) {}
}

/// Counts for one finished round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub asked: usize,
    pub answered: usize,
    pub correct: usize,
    pub skipped: usize,
}

/// The rehearsal engine. Owns the tracker for the whole session.
pub struct RehearsalEngine {
    provider: Arc<dyn GenerationProvider>,
    tracker: MasteryTracker,
    config: EngineConfig,
}

impl RehearsalEngine {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        tracker: MasteryTracker,
        config: EngineConfig,
    ) -> Self {
        Self {
            provider,
            tracker,
            config,
        }
    }

    pub fn tracker(&self) -> &MasteryTracker {
        &self.tracker
    }

    pub fn into_tracker(self) -> MasteryTracker {
        self.tracker
    }

    async fn generate_text(&self, prompt: String, temperature: f64) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system_prompt: self.config.system_prompt_override.clone(),
            max_tokens: self.config.max_tokens,
            temperature,
        };

        let response = self.provider.generate(&request).await?;
        tracing::debug!(
            provider = self.provider.name(),
            model = %response.model,
            latency_ms = response.latency_ms,
            tokens = response.token_usage.total_tokens,
            "generation complete"
        );

        if response.content.trim().is_empty() {
            return Err(GenerationFailure::EmptyResponse(response.model).into());
        }
        Ok(response.content)
    }

    /// Generate and extract questions for a request.
    ///
    /// A generation failure is returned as-is; it is not retried.
    pub async fn generate_questions(&self, request: &QuizRequest) -> Result<Vec<Question>> {
        let raw = self
            .generate_text(build_prompt(request), self.config.temperature)
            .await
            .inspect_err(|e| tracing::error!(topic = %request.topic, "question generation failed: {e:#}"))?;

        let questions = extract(&raw, request.kind);
        if questions.len() != request.count as usize {
            tracing::warn!(
                requested = request.count,
                extracted = questions.len(),
                "generator returned a different number of questions"
            );
        }
        Ok(questions)
    }

    async fn judge(&self, question: &TheoryQuestion, answer: &str) -> Result<Evaluation, SkipReason> {
        let prompt = build_evaluation_prompt(&question.text, &question.model_answer, answer);
        // grading should be repeatable
        let call = self.generate_text(prompt, 0.0);

        let reply = match self.config.evaluation_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(reply) => reply,
                Err(_) => return Err(SkipReason::JudgeTimedOut(limit)),
            },
            None => call.await,
        };

        reply
            .map(|text| evaluation_from_reply(&text))
            .map_err(|e| SkipReason::JudgeFailed(format!("{e:#}")))
    }

    async fn evaluate(&self, question: &Question, answer: &str) -> Result<Evaluation, SkipReason> {
        match question {
            Question::Mcq(q) => evaluate_choice(q, answer).ok_or(SkipReason::Unscorable),
            Question::Theory(q) => self.judge(q, answer).await,
        }
    }

    /// Run one round: generate, present, evaluate, record.
    ///
    /// Returns an error only when generation fails or the candidate aborts;
    /// answers recorded before that point stay recorded.
    pub async fn run_round(
        &mut self,
        request: &QuizRequest,
        candidate: &mut dyn Candidate,
        observer: &dyn RoundObserver,
    ) -> Result<RoundSummary> {
        let start = Instant::now();
        let questions = self.generate_questions(request).await?;
        let total = questions.len();
        observer.on_questions_ready(request, total);

        let mut summary = RoundSummary {
            asked: total,
            ..Default::default()
        };

        for (i, question) in questions.iter().enumerate() {
            let response = candidate.respond(question, i + 1, total)?;
            let answer = response.answer.trim();

            let outcome = if answer.is_empty() {
                Err(SkipReason::NoAnswer)
            } else {
                self.evaluate(question, answer).await
            };

            match outcome {
                Ok(evaluation) => {
                    let event = self.tracker.record_answer(
                        &request.topic,
                        question.text(),
                        evaluation.is_correct,
                        &evaluation.text,
                        response.time_taken.map(|d| d.as_secs_f64()),
                    );
                    observer.on_answer_recorded(question, event);
                    summary.answered += 1;
                    if evaluation.is_correct {
                        summary.correct += 1;
                    }
                }
                Err(reason) => {
                    tracing::warn!(question = %question.text(), "skipping question: {reason}");
                    observer.on_question_skipped(question, &reason);
                    summary.skipped += 1;
                }
            }
        }

        tracing::info!(
            topic = %request.topic,
            asked = summary.asked,
            answered = summary.answered,
            correct = summary.correct,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "round complete"
        );
        Ok(summary)
    }

    /// Ask the generator for a study plan based on the current report.
    pub async fn analyze(&self) -> Result<String> {
        let prompt = build_analysis_prompt(&self.tracker.build_report())?;
        self.generate_text(prompt, self.config.temperature).await
    }
}
