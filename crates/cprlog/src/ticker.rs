//! Interactive session with a running compression ticker.
//!
//! [`run_interactive`] reads commands line by line while a one-second
//! interval credits compression time. Both arms of the `select!` run on the
//! same task, so a tick never lands in the middle of a command.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::catalog::{quick_drugs, AIRWAY_PROCEDURES, RHYTHMS, SHOCK_LEVELS};
use crate::cli::output::{log_plain, status_text};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::export::ExportFormat;
use crate::recorder::Recorder;
use crate::session::COMPRESSION_TICK_MS;
use crate::storage::KeyValueStore;

/// How often the ticker fires.
pub const TICK_INTERVAL: Duration = Duration::from_millis(COMPRESSION_TICK_MS.unsigned_abs());

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Show timers and counts.
    Status,
    /// Show the event log.
    Log,
    /// Write an export file.
    Export(ExportFormat),
    /// Clear the session; only honoured when confirmed.
    Reset {
        /// Whether the user typed `reset yes`.
        confirmed: bool,
    },
    /// Show the command list.
    Help,
    /// Leave the loop.
    Quit,
    /// A ledger action.
    Action(Action),
}

impl FromStr for Input {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let line = s.trim();
        let mut words = line.split_whitespace();
        let word = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next().map(str::to_ascii_lowercase);

        let input = match (word.as_str(), arg.as_deref()) {
            ("status" | "s", None) => Self::Status,
            ("log" | "l", None) => Self::Log,
            ("export", Some("csv")) => Self::Export(ExportFormat::Csv),
            ("export", Some("json")) => Self::Export(ExportFormat::Json),
            ("export", Some("print" | "html")) => Self::Export(ExportFormat::Print),
            ("export", Some(_)) => return Err(Error::unknown_command(line)),
            ("export", None) => return Err(Error::missing_argument("export", "csv, json or print")),
            ("reset", confirm) => Self::Reset {
                confirmed: confirm == Some("yes"),
            },
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit" | "q", None) => Self::Quit,
            _ => Self::Action(line.parse()?),
        };
        Ok(input)
    }
}

/// The command list shown by `help`.
#[must_use]
pub fn help_text() -> String {
    let drugs: Vec<_> = quick_drugs().map(|d| d.code).collect();
    let energies: Vec<_> = SHOCK_LEVELS.iter().map(ToString::to_string).collect();
    format!(
        "Actions:\n\
         \x20 start | pause | cpr            session and compressions\n\
         \x20 rhythm <name>                  {}\n\
         \x20 shock [J]                      {} J\n\
         \x20 epi | drug <code>              {}\n\
         \x20 airway <step> | ett            {}\n\
         \x20 pulse | check | rosc\n\
         \x20 note <text>\n\
         \x20 patient <id|age|sex|weight|location|operator> <value>\n\
         Other:\n\
         \x20 status | log | export <csv|json|print> | reset yes | help | quit",
        RHYTHMS.join(", "),
        energies.join(", "),
        drugs.join(", "),
        AIRWAY_PROCEDURES.join(", "),
    )
}

enum Flow {
    Continue(String),
    Quit,
}

fn handle_line<S, C>(recorder: &mut Recorder<S, C>, line: &str, export_dir: &Path) -> Flow
where
    S: KeyValueStore,
    C: Clock,
{
    let input = match line.parse::<Input>() {
        Ok(input) => input,
        Err(e) => return Flow::Continue(format!("{e} (type 'help' for commands)")),
    };
    debug!(?input, "interactive command");

    let text = match input {
        Input::Quit => return Flow::Quit,
        Input::Help => help_text(),
        Input::Status => status_text(recorder.meta(), &recorder.summary()),
        Input::Log => {
            let events = &recorder.session().events;
            if events.is_empty() {
                "No events recorded.".to_string()
            } else {
                log_plain(events)
            }
        }
        Input::Export(format) => match recorder.export_to(format, export_dir) {
            Ok(path) => format!("Wrote {}", path.display()),
            Err(e) => {
                warn!(error = %e, "export failed");
                format!("Export failed: {e}")
            }
        },
        Input::Reset { confirmed: false } => {
            "This clears every event and timer. Type 'reset yes' to confirm.".to_string()
        }
        Input::Reset { confirmed: true } => {
            recorder.reset();
            "Session reset".to_string()
        }
        Input::Action(action) => match recorder.apply(action) {
            Ok(outcome) => outcome.to_string(),
            Err(e) => e.to_string(),
        },
    };
    Flow::Continue(text)
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

/// Run an interactive session until `quit` or end of input.
///
/// Exports are written into `export_dir`.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run_interactive<S, C, R, W>(
    recorder: &mut Recorder<S, C>,
    input: R,
    output: &mut W,
    export_dir: &Path,
) -> Result<()>
where
    S: KeyValueStore,
    C: Clock,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("interactive session opened");
    write_line(output, "cprlog interactive session. Type 'help' for commands.").await?;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                recorder.tick();
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match handle_line(recorder, &line, export_dir) {
                    Flow::Continue(text) => write_line(output, &text).await?,
                    Flow::Quit => break,
                }
            }
        }
    }

    info!(events = recorder.session().events.len(), "interactive session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RecorderConfig;
    use crate::event::EventCategory;
    use crate::storage::Storage;

    const T0: i64 = 1_700_000_000_000;

    fn recorder() -> Recorder<Storage, ManualClock> {
        crate::logging::init_test_logging();
        Recorder::open(
            Storage::open_in_memory().unwrap(),
            ManualClock::at_millis(T0),
            &RecorderConfig::default(),
        )
    }

    async fn run_script(recorder: &mut Recorder<Storage, ManualClock>, script: &str, dir: &Path) -> String {
        let mut out = Vec::new();
        run_interactive(recorder, script.as_bytes(), &mut out, dir)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_meta_commands() {
        assert_eq!("status".parse::<Input>().unwrap(), Input::Status);
        assert_eq!("LOG".parse::<Input>().unwrap(), Input::Log);
        assert_eq!(
            "export print".parse::<Input>().unwrap(),
            Input::Export(ExportFormat::Print)
        );
        assert_eq!(
            "reset".parse::<Input>().unwrap(),
            Input::Reset { confirmed: false }
        );
        assert_eq!(
            "reset yes".parse::<Input>().unwrap(),
            Input::Reset { confirmed: true }
        );
        assert_eq!("quit".parse::<Input>().unwrap(), Input::Quit);
        assert!("export".parse::<Input>().is_err());
        assert!("export pdf".parse::<Input>().is_err());
    }

    #[test]
    fn test_parse_falls_through_to_actions() {
        assert_eq!(
            "shock 120".parse::<Input>().unwrap(),
            Input::Action(Action::Shock(Some(120.0)))
        );
        assert!("bogus".parse::<Input>().is_err());
    }

    #[test]
    fn test_help_lists_catalogs() {
        let help = help_text();
        assert!(help.contains("VF/VT"));
        assert!(help.contains("360"));
        assert!(help.contains("AMIO"));
        assert!(help.contains("BVM"));
    }

    #[tokio::test]
    async fn test_script_records_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder();
        let out = run_script(
            &mut recorder,
            "start\nrhythm VF/VT\nshock\n\nepi\nnonsense\nstatus\nquit\npulse\n",
            dir.path(),
        )
        .await;

        let categories: Vec<_> = recorder
            .session()
            .events
            .iter()
            .map(|e| e.category)
            .collect();
        assert_eq!(
            categories,
            [EventCategory::Rhythm, EventCategory::Shock, EventCategory::Drug]
        );
        assert!(out.contains("Session started"));
        assert!(out.contains("Logged Shock: Shock 200 J"));
        assert!(out.contains("unknown command: 'nonsense'"));
        assert!(out.contains("Epi given:     1"));
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder();
        let out = run_script(&mut recorder, "epi\nreset\n", dir.path()).await;
        assert_eq!(recorder.session().events.len(), 1);
        assert!(out.contains("reset yes"));

        run_script(&mut recorder, "reset yes\n", dir.path()).await;
        assert!(recorder.session().events.is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder();
        let out = run_script(&mut recorder, "note arrived\nexport csv\n", dir.path()).await;
        assert!(out.contains("Wrote "));
        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
    }
}
