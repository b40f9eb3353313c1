//! The session ledger.
//!
//! A [`Session`] holds the arrest reference time, the append-only event log,
//! the compression timer and the last-epinephrine / last-shock markers. It
//! is a plain owned value: every mutation goes through `&mut self` and takes
//! the current time as an argument, so the caller decides where time comes
//! from and who owns the state.
//!
//! Two inherited rules are kept on purpose:
//!
//! - [`Session::start`] always moves the arrest timestamp to `now`, so a
//!   pause followed by a resume restarts the arrest clock.
//! - Only [`Session::record_epinephrine`] moves the epinephrine marker. An
//!   epinephrine entry logged through [`Session::record_drug`] counts toward
//!   [`Session::epinephrine_count`] but leaves the marker alone.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::catalog::DrugDescriptor;
use crate::clock::millis_between;
use crate::event::{Details, Event, EventCategory};

/// Compression time advances in whole quanta of this many milliseconds.
pub const COMPRESSION_TICK_MS: i64 = 1000;

/// Label of the event appended when compressions start.
pub const COMPRESSIONS_START: &str = "Compressions START";

/// Label of the event appended when compressions stop.
pub const COMPRESSIONS_STOP: &str = "Compressions STOP";

/// Running and accumulated chest-compression time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionTimer {
    /// Whether compressions are in progress.
    pub is_running: bool,

    /// When the current segment started. Set whenever `is_running` is.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub segment_started_at: Option<DateTime<Utc>>,

    /// Compression time credited so far, in whole quanta.
    pub accumulated_ms: i64,

    /// Anchor of the last credited quantum.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_tick_at: Option<DateTime<Utc>>,
}

impl CompressionTimer {
    /// Credit every whole quantum elapsed since the last one.
    ///
    /// Returns the number of milliseconds added. Partial quanta wait for the
    /// next call.
    pub fn tick(&mut self, now: DateTime<Utc>) -> i64 {
        if !self.is_running {
            return 0;
        }
        let Some(anchor) = self.last_tick_at.or(self.segment_started_at) else {
            return 0;
        };
        let quanta = millis_between(anchor, now) / COMPRESSION_TICK_MS;
        if quanta <= 0 {
            return 0;
        }
        let added = quanta * COMPRESSION_TICK_MS;
        self.accumulated_ms += added;
        self.last_tick_at = Some(anchor + Duration::milliseconds(added));
        added
    }
}

/// Derived timers and counts at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Whether the session is running (not paused).
    pub running: bool,
    /// Arrest time, 0 when paused.
    pub elapsed_arrest_ms: i64,
    /// Credited compression time.
    pub compression_total_ms: i64,
    /// Whether compressions are in progress.
    pub compressions_running: bool,
    /// Time since the last dedicated epinephrine entry.
    pub since_last_epinephrine_ms: Option<i64>,
    /// Time since the last shock.
    pub since_last_shock_ms: Option<i64>,
    /// Epinephrine entries in the log.
    pub epinephrine_count: usize,
    /// Shocks in the log.
    pub shock_count: usize,
    /// Total entries in the log.
    pub event_count: usize,
}

/// The full mutable state of one resuscitation record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// When the session was last started; `None` while paused or fresh.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub session_started_at: Option<DateTime<Utc>>,

    /// Reference zero for event offsets.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub arrest_timestamp: Option<DateTime<Utc>>,

    /// The log, in insertion (chronological) order.
    pub events: Vec<Event>,

    /// Marker for the last dedicated epinephrine entry.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_epinephrine_at: Option<DateTime<Utc>>,

    /// Marker for the last shock.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_shock_at: Option<DateTime<Utc>>,

    /// Compression timer state.
    pub compression_timer: CompressionTimer,
}

impl Session {
    /// A fresh, empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the session is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session_started_at.is_some()
    }

    /// Start or resume. No-op while running.
    ///
    /// Resuming moves the arrest timestamp to `now`; offsets of events
    /// recorded afterwards are measured from the resume.
    ///
    /// Returns `true` if the session was not already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_running() {
            return false;
        }
        self.session_started_at = Some(now);
        self.arrest_timestamp = Some(now);
        debug!(at = %now, "session started");
        true
    }

    /// Pause. Events, markers and timers are kept.
    pub fn stop(&mut self) {
        self.session_started_at = None;
        debug!("session paused");
    }

    /// Clear everything back to a fresh session.
    pub fn reset(&mut self) {
        *self = Self::default();
        debug!("session reset");
    }

    /// Append an event and return it.
    pub fn record_event(
        &mut self,
        now: DateTime<Utc>,
        category: EventCategory,
        label: impl Into<String>,
        details: Details,
    ) -> &Event {
        let event = Event::new(now, self.arrest_timestamp, category, label, details);
        debug!(
            category = %event.category,
            label = %event.label,
            offset_ms = event.relative_offset_ms,
            "event recorded"
        );
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// Log a shock at the given energy and move the shock marker.
    pub fn record_shock(&mut self, now: DateTime<Utc>, energy_joules: f64) -> &Event {
        self.last_shock_at = Some(now);
        self.record_event(
            now,
            EventCategory::Shock,
            format!("Shock {energy_joules} J"),
            Details::new(),
        )
    }

    /// Log a 1 mg epinephrine dose and move the epinephrine marker.
    pub fn record_epinephrine(&mut self, now: DateTime<Utc>) -> &Event {
        self.last_epinephrine_at = Some(now);
        self.record_event(
            now,
            EventCategory::Drug,
            "Epinephrine 1 mg",
            Details::new().with("dose", "1 mg").with("route", "IV/IO"),
        )
    }

    /// Log a catalog drug with its default dose. Markers are untouched.
    pub fn record_drug(&mut self, now: DateTime<Utc>, drug: &DrugDescriptor) -> &Event {
        self.record_event(
            now,
            EventCategory::Drug,
            drug.display_label(),
            Details::new().with("dose", drug.default_dose),
        )
    }

    /// Log a rhythm call.
    pub fn record_rhythm(&mut self, now: DateTime<Utc>, rhythm: impl Into<String>) -> &Event {
        self.record_event(now, EventCategory::Rhythm, rhythm, Details::new())
    }

    /// Log an airway step or procedure.
    pub fn record_airway(&mut self, now: DateTime<Utc>, label: impl Into<String>) -> &Event {
        self.record_event(now, EventCategory::Airway, label, Details::new())
    }

    /// Log endotracheal tube placement.
    pub fn record_intubation(&mut self, now: DateTime<Utc>) -> &Event {
        self.record_airway(now, "ETT placed")
    }

    /// Log a pulse check.
    pub fn record_pulse_check(&mut self, now: DateTime<Utc>) -> &Event {
        self.record_event(now, EventCategory::Assessment, "Pulse check", Details::new())
    }

    /// Log a rhythm check.
    pub fn record_rhythm_check(&mut self, now: DateTime<Utc>) -> &Event {
        self.record_event(now, EventCategory::Assessment, "Rhythm check", Details::new())
    }

    /// Log return of spontaneous circulation: a `ROSC` rhythm call followed
    /// by an outcome entry.
    pub fn record_rosc(&mut self, now: DateTime<Utc>) -> &Event {
        self.record_rhythm(now, "ROSC");
        self.record_event(now, EventCategory::Outcome, "ROSC announced", Details::new())
    }

    /// Log a free-text note. Blank text records nothing.
    pub fn record_note(&mut self, now: DateTime<Utc>, text: &str) -> Option<&Event> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(self.record_event(now, EventCategory::Note, text, Details::new()))
    }

    /// Start or stop compressions, logging the transition.
    ///
    /// Stopping keeps whatever the last tick credited; the partial quantum
    /// in progress is dropped. Returns whether compressions are now running.
    pub fn toggle_compressions(&mut self, now: DateTime<Utc>) -> bool {
        if self.compression_timer.is_running {
            self.record_event(now, EventCategory::Cpr, COMPRESSIONS_STOP, Details::new());
            let timer = &mut self.compression_timer;
            timer.is_running = false;
            timer.segment_started_at = None;
            timer.last_tick_at = None;
        } else {
            self.record_event(now, EventCategory::Cpr, COMPRESSIONS_START, Details::new());
            let timer = &mut self.compression_timer;
            timer.is_running = true;
            timer.segment_started_at = Some(now);
            timer.last_tick_at = Some(now);
        }
        self.compression_timer.is_running
    }

    /// Credit elapsed compression quanta. Returns milliseconds added.
    pub fn tick_compressions(&mut self, now: DateTime<Utc>) -> i64 {
        let added = self.compression_timer.tick(now);
        if added > 0 {
            trace!(
                added_ms = added,
                total_ms = self.compression_timer.accumulated_ms,
                "compression tick"
            );
        }
        added
    }

    /// Arrest time: `now` minus the arrest timestamp while running, else 0.
    #[must_use]
    pub fn elapsed_arrest_ms(&self, now: DateTime<Utc>) -> i64 {
        match (self.is_running(), self.arrest_timestamp) {
            (true, Some(arrest)) => millis_between(arrest, now),
            _ => 0,
        }
    }

    /// Credited compression time.
    ///
    /// This snaps to the tick cadence; the running partial quantum is not
    /// included.
    #[must_use]
    pub fn compression_total_ms(&self) -> i64 {
        self.compression_timer.accumulated_ms
    }

    /// Time since the epinephrine marker, if set.
    #[must_use]
    pub fn time_since_last_epinephrine_ms(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_epinephrine_at.map(|at| millis_between(at, now))
    }

    /// Time since the shock marker, if set.
    #[must_use]
    pub fn time_since_last_shock_ms(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_shock_at.map(|at| millis_between(at, now))
    }

    /// Drug entries whose label mentions epinephrine.
    #[must_use]
    pub fn epinephrine_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_epinephrine()).count()
    }

    /// Shock entries.
    #[must_use]
    pub fn shock_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.category == EventCategory::Shock)
            .count()
    }

    /// All derived values at `now`.
    #[must_use]
    pub fn summary(&self, now: DateTime<Utc>) -> SessionSummary {
        SessionSummary {
            running: self.is_running(),
            elapsed_arrest_ms: self.elapsed_arrest_ms(now),
            compression_total_ms: self.compression_total_ms(),
            compressions_running: self.compression_timer.is_running,
            since_last_epinephrine_ms: self.time_since_last_epinephrine_ms(now),
            since_last_shock_ms: self.time_since_last_shock_ms(now),
            epinephrine_count: self.epinephrine_count(),
            shock_count: self.shock_count(),
            event_count: self.events.len(),
        }
    }
}
