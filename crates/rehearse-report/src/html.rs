//! HTML session report.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use rehearse_core::mastery::FocusKind;
use rehearse_core::report::{Percentage, SessionRecord};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// CSS class for a score cell.
fn score_class(p: Percentage) -> &'static str {
    match p.value() {
        None => "nodata",
        Some(v) if v >= 80.0 => "good",
        Some(v) if v >= 60.0 => "fair",
        Some(_) => "poor",
    }
}

/// Generate an HTML report for a saved session.
pub fn generate_html(session: &SessionRecord) -> String {
    let report = &session.report;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>rehearse session {}</title>\n",
        session.id
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n<h1>Interview practice report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Session <code>{}</code> | {} | {} topics | {} answers</p>\n",
        session.id,
        format_timestamp(&session.created_at),
        report.topic_wise.len(),
        session.history.len(),
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n<h2>Overall</h2>\n");
    html.push_str(&format!(
        "<p class=\"overall {}\"><strong>{}</strong> ({}/{} correct)</p>\n",
        score_class(report.overall.percentage),
        report.overall.percentage,
        report.overall.correct,
        report.overall.total,
    ));
    html.push_str("</section>\n");

    if !report.topic_wise.is_empty() {
        html.push_str("<section class=\"topics\">\n<h2>Topics</h2>\n");
        html.push_str("<table class=\"sortable\" id=\"topics\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable('topics', 0)\">Topic</th><th onclick=\"sortTable('topics', 1)\">Correct</th><th onclick=\"sortTable('topics', 2)\">Total</th><th onclick=\"sortTable('topics', 3)\">Score</th><th>Avg time</th><th>Weak concepts</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (topic, t) in &report.topic_wise {
            let avg = t
                .average_time_seconds
                .map(|s| format!("{s:.1}s"))
                .unwrap_or_else(|| "-".to_string());
            let weak: Vec<String> = t.weak_areas.iter().map(|c| html_escape(c)).collect();
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(topic),
                t.correct,
                t.total,
                score_class(t.percentage),
                t.percentage,
                avg,
                weak.join(", "),
            ));
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    if !report.concept_mastery.is_empty() {
        html.push_str("<section class=\"concepts\">\n<h2>Concepts</h2>\n");
        html.push_str("<table class=\"sortable\" id=\"concepts\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable('concepts', 0)\">Concept</th><th onclick=\"sortTable('concepts', 1)\">Correct</th><th onclick=\"sortTable('concepts', 2)\">Total</th><th onclick=\"sortTable('concepts', 3)\">Mastery</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (concept, c) in &report.concept_mastery {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
                html_escape(concept),
                c.correct,
                c.total,
                score_class(c.percentage),
                c.percentage,
            ));
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    html.push_str("<section class=\"focus\">\n<h2>Where to focus</h2>\n");
    if report.weak_areas.is_empty() {
        html.push_str("<p>No weak areas recorded.</p>\n");
    } else {
        let weak: Vec<String> = report.weak_areas.iter().map(|c| html_escape(c)).collect();
        html.push_str(&format!(
            "<p><strong>Weak areas:</strong> {}</p>\n",
            weak.join(", ")
        ));
    }
    if !report.recommended_focus.is_empty() {
        html.push_str("<ol>\n");
        for item in &report.recommended_focus {
            let (class, label) = match item.kind {
                FocusKind::Weak => ("poor", "weak"),
                FocusKind::Practice => ("fair", "practice"),
            };
            html.push_str(&format!(
                "<li><span class=\"tag {class}\">{label}</span> {} ({})</li>\n",
                html_escape(&item.concept),
                item.mastery_percentage,
            ));
        }
        html.push_str("</ol>\n");
    }
    html.push_str("</section>\n");

    if !session.history.is_empty() {
        html.push_str("<section class=\"history\">\n<h2>Answers</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>#</th><th>Topic</th><th>Question</th><th>Result</th><th>Time</th><th>At</th><th>Feedback</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (i, event) in session.history.iter().enumerate() {
            let (class, verdict) = if event.is_correct {
                ("good", "correct")
            } else {
                ("poor", "incorrect")
            };
            let time = event
                .time_taken_seconds
                .map(|s| format!("{s:.1}s"))
                .unwrap_or_else(|| "-".to_string());
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{class}\">{verdict}</td><td>{time}</td><td>{}</td><td>{}</td></tr>\n",
                i + 1,
                html_escape(&event.topic),
                html_escape(&event.question_text),
                event.timestamp.format("%H:%M:%S"),
                html_escape(&event.evaluation_text),
            ));
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw report JSON</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file, creating parent directories.
pub fn write_html_report(session: &SessionRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, generate_html(session))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --muted: #6b7280; --border: #e5e7eb; --good: #dcfce7; --fair: #fef9c3; --poor: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --good: #064e3b; --fair: #713f12; --poor: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 960px; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); }
.overall { font-size: 1.5rem; padding: 0.75rem 1rem; border-radius: 8px; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); }
table.sortable th[onclick] { cursor: pointer; }
.good { background: var(--good); }
.fair { background: var(--fair); }
.poor { background: var(--poor); }
.tag { display: inline-block; min-width: 5rem; padding: 0 0.5rem; border-radius: 4px; font-size: 0.85rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = !(table.dataset.sortCol == col && table.dataset.sortDir == 'asc');
  const key = cell => {
    const n = parseFloat(cell.textContent);
    return isNaN(n) ? cell.textContent : n;
  };
  rows.sort((a, b) => {
    const va = key(a.cells[col]);
    const vb = key(b.cells[col]);
    const cmp = typeof va === 'number' && typeof vb === 'number' ? va - vb : String(va).localeCompare(String(vb));
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rehearse_core::mastery::MasteryTracker;

    fn make_session() -> SessionRecord {
        let mut tracker = MasteryTracker::new();
        tracker.record_answer(
            "Data Structures",
            "How does a stack differ from a queue?",
            true,
            "Correct. LIFO vs FIFO.",
            Some(12.5),
        );
        tracker.record_answer(
            "Data Structures",
            "When is a hash <table> slower than a tree lookup?",
            false,
            "Incorrect. Think about collisions & ordering.",
            None,
        );
        let mut session = SessionRecord::from_tracker(&tracker);
        session.id = uuid::Uuid::nil();
        session.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        session.history[0].timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 9, 31, 5).unwrap();
        session
    }

    #[test]
    fn timestamps_are_rendered_in_utc() {
        let html = generate_html(&make_session());
        assert!(html.contains("| 2024-05-01 09:30:00 UTC |"));
        assert!(html.contains("<td>12.5s</td><td>09:31:05</td>"));
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html(&make_session());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>"));
        assert!(html.contains("00000000-0000-0000-0000-000000000000"));
        assert!(html.contains("<td>Data Structures</td>"));
        assert!(html.contains("50.00%"));
        assert!(html.contains("<td>stack</td>"));
        assert!(html.contains("Weak areas:</strong> hash, tree"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = generate_html(&make_session());
        assert!(html.contains("hash &lt;table&gt; slower"));
        assert!(html.contains("collisions &amp; ordering"));
        assert!(!html.contains("hash <table>"));
    }

    #[test]
    fn empty_session_renders() {
        let session = SessionRecord::from_tracker(&MasteryTracker::new());
        let html = generate_html(&session);
        assert!(html.contains("n/a"));
        assert!(html.contains("No weak areas recorded."));
        assert!(!html.contains("<h2>Topics</h2>"));
    }

    #[test]
    fn html_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.html");

        write_html_report(&make_session(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
