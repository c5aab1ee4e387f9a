//! The `rehearse report` command and the terminal summary tables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use rehearse_core::mastery::FocusKind;
use rehearse_core::report::{Report, SessionRecord};
use rehearse_report::html::generate_html;

pub fn execute(session_path: PathBuf, format: String, output: Option<PathBuf>) -> Result<()> {
    let session = SessionRecord::load_json(&session_path)?;

    let rendered = match format.as_str() {
        "text" => render_text(&session.report),
        "json" => serde_json::to_string_pretty(&session.report)?,
        "markdown" | "md" => session.report.to_markdown(),
        "html" => generate_html(&session),
        other => anyhow::bail!("unknown format '{other}'; expected text, json, markdown or html"),
    };

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Report written to: {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Per-topic table with an overall row.
pub fn summary_table(report: &Report) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Topic",
        "Correct",
        "Total",
        "Score",
        "Avg time",
        "Weak concepts",
    ]);

    for (topic, t) in &report.topic_wise {
        table.add_row(vec![
            Cell::new(topic),
            Cell::new(t.correct),
            Cell::new(t.total),
            Cell::new(t.percentage),
            Cell::new(
                t.average_time_seconds
                    .map(|s| format!("{s:.1}s"))
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(t.weak_areas.join(", ")),
        ]);
    }

    table.add_row(vec![
        Cell::new("Overall"),
        Cell::new(report.overall.correct),
        Cell::new(report.overall.total),
        Cell::new(report.overall.percentage),
        Cell::new(""),
        Cell::new(report.weak_areas.join(", ")),
    ]);
    table
}

fn concept_table(report: &Report) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Concept", "Correct", "Total", "Mastery"]);
    for (concept, c) in &report.concept_mastery {
        table.add_row(vec![
            Cell::new(concept),
            Cell::new(c.correct),
            Cell::new(c.total),
            Cell::new(c.percentage),
        ]);
    }
    table
}

/// Focus list as plain lines, lowest mastery first.
pub fn focus_lines(report: &Report) -> Vec<String> {
    report
        .recommended_focus
        .iter()
        .map(|item| {
            let label = match item.kind {
                FocusKind::Weak => "weak",
                FocusKind::Practice => "practice",
            };
            format!("{} [{label}] {}", item.concept, item.mastery_percentage)
        })
        .collect()
}

fn render_text(report: &Report) -> String {
    let mut out = format!("{}\n", summary_table(report));
    if !report.concept_mastery.is_empty() {
        out.push_str(&format!("\n{}\n", concept_table(report)));
    }
    let focus = focus_lines(report);
    if !focus.is_empty() {
        out.push_str("\nRecommended focus:\n");
        for line in focus {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}
