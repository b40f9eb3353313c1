//! `cprlog` - A resuscitation event recorder
//!
//! This library keeps the running record of a cardiac arrest: the arrest
//! clock, chest-compression time, time since the last epinephrine dose and
//! shock, and a timestamped log of every intervention. State is persisted
//! to a local store after each change and can be exported as CSV, JSON or a
//! printable HTML summary.
//!
//! The ledger itself ([`Session`]) is a plain value; [`Recorder`] ties it to
//! a [`Clock`] and a [`KeyValueStore`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod action;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod logging;
pub mod patient;
pub mod recorder;
pub mod session;
pub mod storage;
pub mod ticker;

pub use action::{Action, Outcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use event::{Details, Event, EventCategory};
pub use export::ExportFormat;
pub use logging::init_logging;
pub use patient::{PatientMeta, PatientUpdate};
pub use recorder::Recorder;
pub use session::{Session, SessionSummary};
pub use storage::{KeyValueStore, StateStore, Storage, StorageStats};
