//! Printable HTML summary.

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone, Utc};

use super::csv::row_cells;
use super::COLUMNS;
use crate::clock::format_clock;
use crate::patient::PatientMeta;
use crate::session::Session;

const STYLE: &str = "body{font-family:ui-sans-serif,system-ui;padding:24px} \
h1{font-size:20px;margin:0 0 8px} \
table{width:100%;border-collapse:collapse} \
th,td{border-bottom:1px solid #ddd;padding:6px 8px;text-align:left;font-size:12px} \
.muted{color:#666}";

/// Escape text for HTML element content and attribute values.
#[must_use]
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the "CPR Summary" page: patient line, timers and counts, and the
/// full event table. `now` is the generation time; clock columns use `tz`.
#[must_use]
pub fn render<Tz: TimeZone>(
    meta: &PatientMeta,
    session: &Session,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let generated = now.with_timezone(tz).format("%Y-%m-%d %H:%M:%S");
    let timers = format!(
        "Arrest duration: {} | CPR time: {} | Epi: {} | Shocks: {}",
        format_clock(session.elapsed_arrest_ms(now)),
        format_clock(session.compression_total_ms()),
        session.epinephrine_count(),
        session.shock_count(),
    );

    let mut body = String::new();
    body.push_str("<h1>CPR Summary</h1>");
    let _ = write!(body, "<div class=\"muted\">Generated: {generated}</div>");
    let _ = write!(
        body,
        "<h2>Patient</h2><div class=\"muted\">{}</div>",
        html_escape(&meta.summary_line())
    );
    let _ = write!(
        body,
        "<h2>Timers &amp; Counts</h2><div class=\"muted\">{}</div>",
        html_escape(&timers)
    );

    body.push_str("<h2>Events</h2><table><thead><tr>");
    for column in COLUMNS {
        let _ = write!(body, "<th>{}</th>", html_escape(column));
    }
    body.push_str("</tr></thead><tbody>");
    for event in &session.events {
        body.push_str("<tr>");
        for cell in row_cells(event, tz) {
            let _ = write!(body, "<td>{}</td>", html_escape(&cell));
        }
        body.push_str("</tr>");
    }
    body.push_str("</tbody></table>");

    format!(
        "<html><head><title>CPR Summary</title><style>{STYLE}</style></head><body>{body}</body></html>"
    )
}
