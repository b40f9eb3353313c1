//! The recorder: a session, its patient metadata, a clock and a store.
//!
//! [`Recorder`] is the application instance. It restores persisted state on
//! open, routes every [`Action`] to the session ledger with the clock's
//! current time, and writes the affected blob back after each change.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

use crate::action::{Action, Outcome};
use crate::catalog::find_drug;
use crate::clock::Clock;
use crate::config::RecorderConfig;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::export::{self, ExportFormat};
use crate::patient::{PatientMeta, PatientUpdate};
use crate::session::{Session, SessionSummary};
use crate::storage::{KeyValueStore, StateStore, META_KEY, SESSION_KEY};

/// Owns the live session and keeps the store in step with it.
#[derive(Debug)]
pub struct Recorder<S, C> {
    store: StateStore<S>,
    clock: C,
    session: Session,
    meta: PatientMeta,
    default_shock_energy: f64,
}

impl<S: KeyValueStore, C: Clock> Recorder<S, C> {
    /// Restore state from `store` and catch up compression time.
    ///
    /// Missing or unreadable blobs fall back to a fresh session and to
    /// metadata with the configured default location.
    pub fn open(store: S, clock: C, config: &RecorderConfig) -> Self {
        let store = StateStore::new(store);
        let session: Session = store.load_or_default(SESSION_KEY);
        let meta = store.load_or_else(META_KEY, || {
            PatientMeta::with_location(config.default_location.clone())
        });
        debug!(
            events = session.events.len(),
            running = session.is_running(),
            "recorder state restored"
        );

        let mut recorder = Self {
            store,
            clock,
            session,
            meta,
            default_shock_energy: config.default_shock_energy_joules,
        };
        recorder.tick();
        recorder
    }

    /// The current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The patient metadata.
    pub fn meta(&self) -> &PatientMeta {
        &self.meta
    }

    /// The wrapped store.
    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    /// Give back the underlying store.
    pub fn into_store(self) -> S {
        self.store.into_inner()
    }

    /// Apply an action and persist the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDrug`] for a drug code not in the catalog.
    /// Nothing else fails; storage trouble is only logged.
    pub fn apply(&mut self, action: Action) -> Result<Outcome> {
        let outcome = match action {
            Action::Start => {
                if self.start() {
                    Outcome::Started
                } else {
                    Outcome::AlreadyRunning
                }
            }
            Action::Pause => {
                self.pause();
                Outcome::Paused
            }
            Action::Reset => {
                self.reset();
                Outcome::Reset
            }
            Action::ToggleCompressions => Outcome::Compressions {
                running: self.toggle_compressions(),
            },
            Action::Rhythm(rhythm) => Outcome::Recorded(self.rhythm(&rhythm)),
            Action::Shock(energy) => Outcome::Recorded(self.shock(energy)),
            Action::Epinephrine => Outcome::Recorded(self.epinephrine()),
            Action::Drug(code) => Outcome::Recorded(self.drug(&code)?),
            Action::Airway(label) => Outcome::Recorded(self.airway(&label)),
            Action::Intubation => Outcome::Recorded(self.intubation()),
            Action::PulseCheck => Outcome::Recorded(self.pulse_check()),
            Action::RhythmCheck => Outcome::Recorded(self.rhythm_check()),
            Action::Rosc => Outcome::Recorded(self.rosc()),
            Action::Note(text) => self.note(&text).map_or(Outcome::Ignored, Outcome::Recorded),
            Action::SetPatient(update) => Outcome::PatientUpdated {
                changed: self.set_patient(&update),
            },
        };
        Ok(outcome)
    }

    /// Start or resume. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        let now = self.clock.now();
        let started = self.session.start(now);
        if started {
            info!("session started");
            self.save_session();
        }
        started
    }

    /// Pause the session.
    pub fn pause(&mut self) {
        self.session.stop();
        info!("session paused");
        self.save_session();
    }

    /// Clear the session and its stored blob. Patient metadata is kept.
    pub fn reset(&mut self) {
        self.session.reset();
        self.store.clear(SESSION_KEY);
        info!("session reset");
    }

    /// Start or stop compressions. Returns whether they are now running.
    pub fn toggle_compressions(&mut self) -> bool {
        let now = self.clock.now();
        // Credit whole quanta up to the stop before the partial is dropped.
        self.session.tick_compressions(now);
        let running = self.session.toggle_compressions(now);
        self.save_session();
        running
    }

    /// Log a shock at `energy` joules, or at the configured default.
    pub fn shock(&mut self, energy: Option<f64>) -> Event {
        let now = self.clock.now();
        let energy = energy.unwrap_or(self.default_shock_energy);
        let event = self.session.record_shock(now, energy).clone();
        self.save_session();
        event
    }

    /// Log a 1 mg epinephrine dose.
    pub fn epinephrine(&mut self) -> Event {
        let now = self.clock.now();
        let event = self.session.record_epinephrine(now).clone();
        self.save_session();
        event
    }

    /// Log a catalog drug by code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDrug`] if the code is not in the catalog.
    pub fn drug(&mut self, code: &str) -> Result<Event> {
        let drug = find_drug(code).ok_or_else(|| Error::unknown_drug(code))?;
        let now = self.clock.now();
        let event = self.session.record_drug(now, drug).clone();
        self.save_session();
        Ok(event)
    }

    /// Log a rhythm call.
    pub fn rhythm(&mut self, rhythm: &str) -> Event {
        let now = self.clock.now();
        let event = self.session.record_rhythm(now, rhythm).clone();
        self.save_session();
        event
    }

    /// Log an airway step.
    pub fn airway(&mut self, label: &str) -> Event {
        let now = self.clock.now();
        let event = self.session.record_airway(now, label).clone();
        self.save_session();
        event
    }

    /// Log endotracheal tube placement.
    pub fn intubation(&mut self) -> Event {
        let now = self.clock.now();
        let event = self.session.record_intubation(now).clone();
        self.save_session();
        event
    }

    /// Log a pulse check.
    pub fn pulse_check(&mut self) -> Event {
        let now = self.clock.now();
        let event = self.session.record_pulse_check(now).clone();
        self.save_session();
        event
    }

    /// Log a rhythm check.
    pub fn rhythm_check(&mut self) -> Event {
        let now = self.clock.now();
        let event = self.session.record_rhythm_check(now).clone();
        self.save_session();
        event
    }

    /// Log ROSC. Returns the closing outcome entry.
    pub fn rosc(&mut self) -> Event {
        let now = self.clock.now();
        let event = self.session.record_rosc(now).clone();
        self.save_session();
        event
    }

    /// Log a note. Blank text records nothing and returns `None`.
    pub fn note(&mut self, text: &str) -> Option<Event> {
        let now = self.clock.now();
        let event = self.session.record_note(now, text).cloned();
        if event.is_some() {
            self.save_session();
        }
        event
    }

    /// Apply a patient metadata update. Returns whether anything changed.
    pub fn set_patient(&mut self, update: &PatientUpdate) -> bool {
        let changed = self.meta.apply(update);
        if changed {
            self.store.save(META_KEY, &self.meta);
        }
        changed
    }

    /// Credit elapsed compression time. Returns milliseconds added.
    pub fn tick(&mut self) -> i64 {
        let added = self.session.tick_compressions(self.clock.now());
        if added > 0 {
            self.save_session();
        }
        added
    }

    /// Derived timers and counts at the current time.
    pub fn summary(&self) -> SessionSummary {
        self.session.summary(self.clock.now())
    }

    /// Render an export in the local time zone.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => Ok(export::csv::render(&self.session, &Local)),
            ExportFormat::Json => export::json::render(&self.meta, &self.session),
            ExportFormat::Print => Ok(export::print::render(
                &self.meta,
                &self.session,
                self.clock.now(),
                &Local,
            )),
        }
    }

    /// Render an export and write it into `dir`. Returns the file path.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn export_to(&self, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
        let contents = self.render_export(format)?;
        export::write(dir, format, &contents, self.clock.now())
    }

    fn save_session(&self) {
        self.store.save(SESSION_KEY, &self.session);
    }
}
