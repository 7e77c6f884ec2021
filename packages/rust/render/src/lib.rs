//! HTML rendering of the resolver report.
//!
//! Produces one self-contained document with inline CSS and one table per
//! [`ReportSection`]. Rows are written in the order given; nothing is re-sorted
//! here. Every interpolated value is HTML-escaped.

mod section;

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use gatewayreport_shared::TimeWindow;
use tracing::debug;

pub use section::{ReportRow, ReportSection, SectionKind};

/// Document title and top-level heading.
pub const REPORT_TITLE: &str = "DNS Gateway Report";

/// A fully joined report, ready to render.
#[derive(Debug, Clone)]
pub struct Report {
    /// When the invocation started.
    pub generated_at: DateTime<Utc>,
    /// The lower bound applied to every query.
    pub window: TimeWindow,
    /// Sections in display order.
    pub sections: Vec<ReportSection>,
}

impl Report {
    /// Total rows across all sections.
    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }
}

/// Render the report as a complete HTML document.
pub fn render_html(report: &Report) -> String {
    let mut tables = String::new();
    for section in &report.sections {
        render_section(&mut tables, section);
    }

    debug!(
        sections = report.sections.len(),
        rows = report.row_count(),
        "rendered report"
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <h1>{title}</h1>
    <p class="window">Events since {since} (generated {generated})</p>
    <div class="table-container">
{tables}    </div>
</body>
</html>
"#,
        title = REPORT_TITLE,
        css = inline_css(),
        since = html_escape(&report.window.to_iso8601()),
        generated = report
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        tables = tables,
    )
}

fn render_section(out: &mut String, section: &ReportSection) {
    let kind = section.kind;

    // Writing to a String cannot fail.
    let _ = writeln!(out, "        <div>");
    let _ = writeln!(out, "            <h2>{}</h2>", html_escape(kind.title()));
    let _ = writeln!(out, "            <table>");

    out.push_str("                <thead><tr>");
    for header in kind.headers() {
        let _ = write!(out, "<th>{}</th>", html_escape(header));
    }
    out.push_str("</tr></thead>\n");

    // One row per line keeps the body within mail line-length limits.
    out.push_str("                <tbody>\n");
    for row in &section.rows {
        out.push_str("                    <tr>");
        for cell in row.cells() {
            let _ = write!(out, "<td>{}</td>", html_escape(&cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("                </tbody>\n");

    let _ = writeln!(out, "            </table>");
    let _ = writeln!(out, "        </div>");
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Inline CSS styles
fn inline_css() -> &'static str {
    r#"
body {
    font-family: Arial, sans-serif;
    background-color: #f9f9f9;
    color: #333;
    text-align: center;
}

.window {
    color: #6b7280;
    font-size: 0.875rem;
}

.table-container {
    display: flex;
    gap: 40px;
    justify-content: center;
    margin-top: 20px;
    flex-wrap: wrap;
    background-color: #ffffff;
}

.table-container div {
    margin-bottom: 40px;
    background-color: #ffffff;
    padding: 10px;
}

table {
    border-collapse: collapse;
    width: 400px;
    background-color: #fdfdff;
    table-layout: fixed;
}

th, td {
    padding: 10px;
    background-color: #e8f0fe;
    text-align: left;
    word-wrap: break-word;
}

th {
    background-color: #cce7ff;
}
"#
}
