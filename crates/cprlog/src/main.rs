//! `cprlog` - CLI for the resuscitation recorder
//!
//! Each invocation opens the persisted session, applies one command and
//! exits; `run` keeps the session open with live timers.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;

use cprlog::cli::output::{drug_list, log_plain, log_table, status_text};
use cprlog::cli::{Cli, Command, ConfigCommand, ExportCommand, OutputFormat};
use cprlog::storage::Storage;
use cprlog::ticker::run_interactive;
use cprlog::{init_logging, Config, ExportFormat, Recorder, SystemClock};

type AppRecorder = Recorder<Storage, SystemClock>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Drugs => {
            println!("{}", drug_list());
            Ok(())
        }
        command => {
            let mut recorder = open_recorder(&config)?;
            handle_recorder_command(&mut recorder, &config, command)
        }
    }
}

fn open_recorder(config: &Config) -> Result<AppRecorder> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("opening state database at {}", path.display()))?;
    Ok(Recorder::open(storage, SystemClock, &config.recorder))
}

fn handle_recorder_command(
    recorder: &mut AppRecorder,
    config: &Config,
    command: Command,
) -> Result<()> {
    match command {
        Command::Reset { yes } => {
            if yes {
                recorder.reset();
                println!("Session reset");
            } else {
                println!("This clears every event and timer. Patient details are kept.");
                println!("Use --yes to confirm.");
            }
            Ok(())
        }
        Command::Status(status_cmd) => {
            let summary = recorder.summary();
            if status_cmd.json {
                let status = serde_json::json!({
                    "summary": summary,
                    "meta": recorder.meta(),
                    "database_path": recorder.store().inner().path(),
                    "storage": recorder.store().inner().stats().ok(),
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", status_text(recorder.meta(), &summary));
            }
            Ok(())
        }
        Command::Log(log_cmd) => {
            let events = &recorder.session().events;
            match log_cmd.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(events)?),
                OutputFormat::Table => print!("{}", log_table(events)),
                OutputFormat::Plain if events.is_empty() => println!("No events recorded."),
                OutputFormat::Plain => println!("{}", log_plain(events)),
            }
            Ok(())
        }
        Command::Export(export_cmd) => handle_export(recorder, config, export_cmd),
        Command::Run => handle_run(recorder, &config.export.output_dir),
        command => {
            let Some(action) = command.into_action() else {
                return Ok(());
            };
            match recorder.apply(action) {
                Ok(outcome) => {
                    println!("{outcome}");
                    Ok(())
                }
                Err(e) if e.is_input_error() => {
                    eprintln!("cprlog: {e}");
                    std::process::exit(2);
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn handle_export(recorder: &AppRecorder, config: &Config, cmd: ExportCommand) -> Result<()> {
    let format = ExportFormat::from(cmd.format);
    let dir = cmd.output.as_deref().unwrap_or(&config.export.output_dir);
    let path = recorder
        .export_to(format, dir)
        .with_context(|| format!("exporting {format} to {}", dir.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn handle_run(recorder: &mut AppRecorder, export_dir: &Path) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    runtime.block_on(async {
        let mut stdout = tokio::io::stdout();
        run_interactive(
            recorder,
            BufReader::new(tokio::io::stdin()),
            &mut stdout,
            export_dir,
        )
        .await
    })?;
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Recorder]");
                println!(
                    "  Default shock:      {} J",
                    config.recorder.default_shock_energy_joules
                );
                println!("  Default location:   {}", config.recorder.default_location);
                println!();
                println!("[Export]");
                println!("  Output directory:   {}", config.export.output_dir.display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
