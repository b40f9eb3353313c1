//! User actions as values.
//!
//! Every tappable operation of the recorder is an [`Action`]. The CLI
//! subcommands build them directly; the interactive loop parses them from
//! typed lines via [`FromStr`].

use std::fmt;
use std::str::FromStr;

use crate::catalog::find_drug;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::patient::PatientUpdate;

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Start or resume the session.
    Start,
    /// Pause the session.
    Pause,
    /// Clear the session. Patient metadata is kept.
    Reset,
    /// Start or stop compressions.
    ToggleCompressions,
    /// Log a rhythm call.
    Rhythm(String),
    /// Log a shock; `None` uses the configured default energy.
    Shock(Option<f64>),
    /// Log a 1 mg epinephrine dose.
    Epinephrine,
    /// Log a catalog drug by code.
    Drug(String),
    /// Log an airway step.
    Airway(String),
    /// Log endotracheal tube placement.
    Intubation,
    /// Log a pulse check.
    PulseCheck,
    /// Log a rhythm check.
    RhythmCheck,
    /// Log return of spontaneous circulation.
    Rosc,
    /// Log a free-text note.
    Note(String),
    /// Update patient metadata.
    SetPatient(PatientUpdate),
}

/// What applying an [`Action`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The session started (or resumed).
    Started,
    /// Start was requested while already running.
    AlreadyRunning,
    /// The session was paused.
    Paused,
    /// The session was cleared.
    Reset,
    /// Compressions were toggled and the transition logged.
    Compressions {
        /// Whether compressions are now running.
        running: bool,
    },
    /// An entry was appended; for multi-entry actions, the last one.
    Recorded(Event),
    /// Nothing was recorded (blank note).
    Ignored,
    /// Patient metadata was updated.
    PatientUpdated {
        /// Whether any field actually changed.
        changed: bool,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "Session started"),
            Self::AlreadyRunning => write!(f, "Session already running"),
            Self::Paused => write!(f, "Session paused"),
            Self::Reset => write!(f, "Session reset"),
            Self::Compressions { running: true } => write!(f, "Compressions started"),
            Self::Compressions { running: false } => write!(f, "Compressions stopped"),
            Self::Recorded(event) => write!(f, "Logged {}: {}", event.category, event.label),
            Self::Ignored => write!(f, "Nothing to log"),
            Self::PatientUpdated { changed: true } => write!(f, "Patient details updated"),
            Self::PatientUpdated { changed: false } => write!(f, "Patient details unchanged"),
        }
    }
}

fn required(command: &str, rest: &str, expected: &'static str) -> Result<String> {
    if rest.is_empty() {
        Err(Error::missing_argument(command, expected))
    } else {
        Ok(rest.to_string())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let line = input.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let action = match word.to_ascii_lowercase().as_str() {
            "start" | "resume" => Self::Start,
            "pause" => Self::Pause,
            "reset" => Self::Reset,
            "cpr" | "compressions" => Self::ToggleCompressions,
            "rhythm" => Self::Rhythm(required(word, rest, "a rhythm name")?),
            "shock" => {
                if rest.is_empty() {
                    Self::Shock(None)
                } else {
                    let energy = rest
                        .trim_end_matches(['J', 'j'])
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| Error::unknown_command(line))?;
                    Self::Shock(Some(energy))
                }
            }
            "epi" | "epinephrine" => Self::Epinephrine,
            "drug" => {
                let code = required(word, rest, "a drug code")?;
                let drug = find_drug(&code).ok_or_else(|| Error::unknown_drug(&code))?;
                Self::Drug(drug.code.to_string())
            }
            "airway" => Self::Airway(required(word, rest, "an airway step")?),
            "ett" | "intubation" => Self::Intubation,
            "pulse" | "pulse-check" => Self::PulseCheck,
            "check" | "rhythm-check" => Self::RhythmCheck,
            "rosc" => Self::Rosc,
            "note" => Self::Note(required(word, rest, "note text")?),
            "patient" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| Error::missing_argument(word, "a field and a value"))?;
                let update = PatientUpdate::field(field, value.trim())
                    .ok_or_else(|| Error::unknown_command(line))?;
                Self::SetPatient(update)
            }
            _ => return Err(Error::unknown_command(line)),
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Action {
        s.parse().unwrap()
    }

    #[test]
    fn test_simple_words() {
        assert_eq!(parse("start"), Action::Start);
        assert_eq!(parse("  PAUSE "), Action::Pause);
        assert_eq!(parse("cpr"), Action::ToggleCompressions);
        assert_eq!(parse("epi"), Action::Epinephrine);
        assert_eq!(parse("ett"), Action::Intubation);
        assert_eq!(parse("pulse"), Action::PulseCheck);
        assert_eq!(parse("check"), Action::RhythmCheck);
        assert_eq!(parse("rosc"), Action::Rosc);
    }

    #[test]
    fn test_argument_words() {
        assert_eq!(parse("rhythm VF/VT"), Action::Rhythm("VF/VT".to_string()));
        assert_eq!(parse("airway BVM"), Action::Airway("BVM".to_string()));
        assert_eq!(
            parse("note   epi drawn up "),
            Action::Note("epi drawn up".to_string())
        );
    }

    #[test]
    fn test_shock() {
        assert_eq!(parse("shock"), Action::Shock(None));
        assert_eq!(parse("shock 150"), Action::Shock(Some(150.0)));
        assert_eq!(parse("shock 360J"), Action::Shock(Some(360.0)));
        assert!(matches!(
            "shock lots".parse::<Action>(),
            Err(Error::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_drug_codes() {
        assert_eq!(parse("drug amio"), Action::Drug("AMIO".to_string()));
        assert!(matches!(
            "drug XYZ".parse::<Action>(),
            Err(Error::UnknownDrug { code }) if code == "XYZ"
        ));
    }

    #[test]
    fn test_patient_field() {
        let Action::SetPatient(update) = parse("patient weight 80") else {
            panic!("expected patient update");
        };
        assert_eq!(update.weight_kg.as_deref(), Some("80"));
        assert!("patient height 180".parse::<Action>().is_err());
        assert!(matches!(
            "patient age".parse::<Action>(),
            Err(Error::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_missing_arguments() {
        for input in ["rhythm", "airway", "note   ", "drug"] {
            assert!(
                matches!(input.parse::<Action>(), Err(Error::MissingArgument { .. })),
                "{input}"
            );
        }
    }

    #[test]
    fn test_unknown() {
        assert!(matches!(
            "defibrillate".parse::<Action>(),
            Err(Error::UnknownCommand { input }) if input == "defibrillate"
        ));
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Paused.to_string(), "Session paused");
        assert_eq!(
            Outcome::Compressions { running: true }.to_string(),
            "Compressions started"
        );
    }
}
