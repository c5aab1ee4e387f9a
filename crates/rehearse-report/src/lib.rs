//! rehearse-report: rendering of saved practice sessions.

pub mod html;

pub use html::{generate_html, write_html_report};
