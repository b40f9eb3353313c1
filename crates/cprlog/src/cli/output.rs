//! Text rendering shared by the one-shot commands and the interactive loop.

use std::fmt::Write as _;

use chrono::Local;

use crate::catalog::DRUGS;
use crate::clock::{format_clock, format_clock_opt, format_time_of_day};
use crate::event::Event;
use crate::patient::PatientMeta;
use crate::session::SessionSummary;

/// Human-readable status block.
#[must_use]
pub fn status_text(meta: &PatientMeta, summary: &SessionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Session:       {}",
        if summary.running { "running" } else { "paused" }
    );
    let _ = writeln!(out, "Arrest time:   {}", format_clock(summary.elapsed_arrest_ms));
    let _ = writeln!(
        out,
        "CPR time:      {} ({})",
        format_clock(summary.compression_total_ms),
        if summary.compressions_running {
            "compressions running"
        } else {
            "compressions stopped"
        }
    );
    let _ = writeln!(
        out,
        "Since epi:     {}",
        format_clock_opt(summary.since_last_epinephrine_ms)
    );
    let _ = writeln!(
        out,
        "Since shock:   {}",
        format_clock_opt(summary.since_last_shock_ms)
    );
    let _ = writeln!(out, "Epi given:     {}", summary.epinephrine_count);
    let _ = writeln!(out, "Shocks:        {}", summary.shock_count);
    let _ = writeln!(out, "Events:        {}", summary.event_count);
    let _ = write!(out, "Patient:       {}", meta.summary_line());
    out
}

/// One line per event: clock, offset, category, label and details.
#[must_use]
pub fn log_plain(events: &[Event]) -> String {
    events
        .iter()
        .map(|e| {
            let mut line = format!(
                "{} T+{} {} {}",
                format_time_of_day(e.timestamp, &Local),
                format_clock(e.relative_offset_ms),
                e.category,
                e.label
            );
            if !e.details.is_empty() {
                let _ = write!(line, " ({})", e.details.render());
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Events as an aligned table with a header.
#[must_use]
pub fn log_table(events: &[Event]) -> String {
    let label_width = events
        .iter()
        .map(|e| e.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("Label".len());

    let mut out = format!(
        "{:<8}  {:>7}  {:<10}  {:<label_width$}  Details\n",
        "Clock", "T+", "Type", "Label"
    );
    let _ = writeln!(out, "{}", "-".repeat(8 + 2 + 7 + 2 + 10 + 2 + label_width + 2 + 7));
    for e in events {
        let _ = writeln!(
            out,
            "{:<8}  {:>7}  {:<10}  {:<label_width$}  {}",
            format_time_of_day(e.timestamp, &Local),
            format_clock(e.relative_offset_ms),
            e.category.as_str(),
            e.label,
            e.details.render()
        );
    }
    out
}

/// The drug catalog, one code per line.
#[must_use]
pub fn drug_list() -> String {
    DRUGS
        .iter()
        .map(|d| format!("{:<8} {}", d.code, d.display_label()))
        .collect::<Vec<_>>()
        .join("\n")
}
