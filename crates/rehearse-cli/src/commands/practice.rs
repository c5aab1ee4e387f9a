//! The `rehearse practice` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use rehearse_core::engine::{Candidate, CandidateResponse, RoundObserver, SkipReason};
use rehearse_core::error::GenerationFailure;
use rehearse_core::model::{AnswerEvent, Question, QuestionKind};
use rehearse_core::prompt::QuizRequest;
use rehearse_core::report::SessionRecord;
use rehearse_report::html::write_html_report;

use super::report::{focus_lines, summary_table};

/// Reads answers line by line and times each one.
pub struct ConsoleCandidate<R, W> {
    input: R,
    output: W,
    closed: bool,
}

impl<R: BufRead, W: Write> ConsoleCandidate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            closed: false,
        }
    }

    /// Show `prompt` and read one trimmed line. `None` once input is closed.
    pub fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).context("failed to read input")? == 0 {
            self.closed = true;
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Candidate for ConsoleCandidate<R, W> {
    fn respond(
        &mut self,
        question: &Question,
        position: usize,
        total: usize,
    ) -> Result<CandidateResponse> {
        writeln!(self.output, "\n[{position}/{total}] {}", question.text())?;
        let prompt = match question {
            Question::Mcq(q) => {
                for option in &q.options {
                    writeln!(self.output, "    {option}")?;
                }
                "Your answer (A-D): "
            }
            Question::Theory(_) => "Your answer: ",
        };

        let start = Instant::now();
        let answer = self.ask(prompt)?.unwrap_or_default();
        Ok(CandidateResponse {
            answer,
            time_taken: Some(start.elapsed()),
        })
    }
}

/// Prints per-question feedback.
struct ConsoleObserver;

impl RoundObserver for ConsoleObserver {
    fn on_questions_ready(&self, request: &QuizRequest, count: usize) {
        println!("\n== {} ({count} {} questions) ==", request.topic, request.kind);
    }

    fn on_answer_recorded(&self, _question: &Question, event: &AnswerEvent) {
        let verdict = if event.is_correct { "correct" } else { "incorrect" };
        println!("  -> {verdict}: {}", event.evaluation_text);
    }

    fn on_question_skipped(&self, _question: &Question, reason: &SkipReason) {
        println!("  -> skipped ({reason})");
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    topic: String,
    count: Option<u32>,
    kind: QuestionKind,
    model: Option<String>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    analyze: bool,
) -> Result<()> {
    let formats: Vec<&str> = match format.as_str() {
        "all" => vec!["json", "html"],
        other => other.split(',').map(str::trim).collect(),
    };
    if let Some(bad) = formats.iter().find(|f| !matches!(**f, "json" | "html")) {
        anyhow::bail!("unknown format '{bad}'; expected json, html or all");
    }
    anyhow::ensure!(!topic.trim().is_empty(), "topic must not be empty");

    let (config, mut engine) = super::build_engine(config_path.as_deref(), model.as_deref())?;
    let count = super::question_count(count, &config)?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let stdin = std::io::stdin();
    let mut candidate = ConsoleCandidate::new(stdin.lock(), std::io::stdout());
    let observer = ConsoleObserver;

    let mut topic = topic.trim().to_string();
    let mut fatal = None;
    loop {
        let request = QuizRequest::new(topic.as_str(), count, kind);
        match engine.run_round(&request, &mut candidate, &observer).await {
            Ok(summary) => {
                println!(
                    "\nRound done: {}/{} correct, {} skipped",
                    summary.correct, summary.answered, summary.skipped
                );
                println!("{}", summary_table(&engine.tracker().build_report()));
            }
            Err(e) => {
                let permanent = e
                    .downcast_ref::<GenerationFailure>()
                    .is_some_and(GenerationFailure::is_permanent);
                if permanent {
                    fatal = Some(e);
                    break;
                }
                eprintln!("Round failed: {e:#}");
            }
        }

        match candidate.ask("\nNext topic (blank to finish): ")? {
            Some(next) if !next.is_empty() => topic = next,
            _ => break,
        }
    }

    let report = engine.tracker().build_report();
    let focus = focus_lines(&report);
    if !focus.is_empty() {
        println!("\nRecommended focus:");
        for line in focus {
            println!("  {line}");
        }
    }

    if analyze && report.overall.total > 0 {
        match engine.analyze().await {
            Ok(plan) => println!("\nStudy plan:\n{}", plan.trim()),
            Err(e) => eprintln!("Study plan unavailable: {e:#}"),
        }
    }

    if engine.tracker().history().is_empty() {
        eprintln!("No answers recorded; nothing saved.");
    } else {
        let session = SessionRecord::from_tracker(engine.tracker());
        let stem = format!("session-{}", session.created_at.format("%Y-%m-%dT%H%M%S"));
        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("{stem}.json"));
                    session.save_json(&path)?;
                    eprintln!("Session saved to: {}", path.display());
                }
                "html" => {
                    let path = output.join(format!("{stem}.html"));
                    write_html_report(&session, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                _ => {}
            }
        }
    }

    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
