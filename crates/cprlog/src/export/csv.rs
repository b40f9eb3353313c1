//! CSV rendering of the event log.

use chrono::TimeZone;

use super::COLUMNS;
use crate::clock::{format_clock, format_time_of_day};
use crate::event::Event;
use crate::session::Session;

/// Quote a field, doubling any embedded quotes.
#[must_use]
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// The display cells of one event, in [`COLUMNS`] order.
#[must_use]
pub fn row_cells<Tz: TimeZone>(event: &Event, tz: &Tz) -> [String; 5]
where
    Tz::Offset: std::fmt::Display,
{
    [
        format_time_of_day(event.timestamp, tz),
        format_clock(event.relative_offset_ms),
        event.category.to_string(),
        event.label.clone(),
        event.details.render(),
    ]
}

fn line<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .map(|c| quote(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render the session as CSV: a header row, then one row per event in log
/// order. Clock times are shown in `tz`.
#[must_use]
pub fn render<Tz: TimeZone>(session: &Session, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    std::iter::once(line(COLUMNS))
        .chain(session.events.iter().map(|e| line(row_cells(e, tz))))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Details, EventCategory};
    use chrono::{DateTime, Utc};

    const T0: i64 = 1_714_558_830_000; // 2024-05-01T10:20:30Z

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote(""), "\"\"");
    }

    #[test]
    fn test_header_only_for_empty_session() {
        let csv = render(&Session::new(), &Utc);
        assert_eq!(
            csv,
            "\"Clock\",\"T+ (mm:ss)\",\"Type\",\"Label\",\"Details\""
        );
    }

    #[test]
    fn test_details_column() {
        let mut session = Session::new();
        session.start(at(T0));
        session.record_event(
            at(T0 + 75_000),
            EventCategory::Drug,
            "Amiodarone",
            Details::new().with("dose", "1 mg"),
        );
        let csv = render(&session, &Utc);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "\"10:21:45\",\"1:15\",\"Drug\",\"Amiodarone\",\"dose:1 mg\""
        );
    }

    #[test]
    fn test_embedded_quotes_and_commas() {
        let mut session = Session::new();
        session.record_note(at(T0), "pt says \"help\", then silent");
        let csv = render(&session, &Utc);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(",\"pt says \"\"help\"\", then silent\",\"\""));
    }

    #[test]
    fn test_rows_in_log_order() {
        let mut session = Session::new();
        session.start(at(T0));
        session.record_shock(at(T0 + 1_000), 200.0);
        session.record_epinephrine(at(T0 + 2_000));
        session.record_pulse_check(at(T0 + 3_000));
        let csv = render(&session, &Utc);
        let types: Vec<_> = csv
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(2).unwrap().to_string())
            .collect();
        assert_eq!(types, ["\"Shock\"", "\"Drug\"", "\"Assessment\""]);
        assert!(csv.contains("\"dose:1 mg route:IV/IO\""));
    }
}
