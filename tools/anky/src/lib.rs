pub mod ankyverse;
pub mod config;
pub mod errors;
pub mod gate;
pub mod logging;
pub mod replay;
pub mod report;
pub mod runtime;
pub mod storage;
pub mod transcript;
pub mod types;

use clap::{error::ErrorKind, Parser};
use config::{load_config, CliOverrides};
use errors::AnkyError;
use gate::evaluate;
use logging::{gate_event, saved_event, session_events, structured_fallback_line, JsonlLogger};
use report::SessionReport;
use runtime::ProductionRuntime;
use storage::{FsSessionStore, SessionStore};
use transcript::parse_session;

/// Exit code when `--require-qualified` is set and the session is too short.
pub const EXIT_TOO_SHORT: i32 = 2;

#[derive(Debug, Clone, Parser)]
#[command(name = "anky")]
#[command(about = "Replay keystroke writing-session transcripts and gate them by elapsed time")]
pub struct Cli {
    #[arg(long)]
    pub transcript: std::path::PathBuf,
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    #[arg(long, default_value_t = false)]
    pub save: bool,
    #[arg(long)]
    pub data_dir: Option<std::path::PathBuf>,
    #[arg(long, default_value_t = false)]
    pub json: bool,
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
    #[arg(long = "elapsed-override")]
    pub elapsed_override: Option<u64>,
    #[arg(long, default_value_t = false)]
    pub require_qualified: bool,
}

pub fn run() -> Result<i32, AnkyError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| AnkyError::Io(e.to_string()))?;
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &cwd, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    cwd: &std::path::Path,
    runtime: &ProductionRuntime,
) -> Result<i32, AnkyError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(AnkyError::Cli(error.to_string())),
        },
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        data_dir: cli.data_dir.clone(),
        log_path: cli.log_file.clone(),
        elapsed_override_seconds: cli.elapsed_override,
    };
    let cfg = load_config(&overrides, cwd, runtime.file_system.as_ref())?;

    let raw = runtime
        .file_system
        .read_to_string(&cwd.join(&cli.transcript))?;
    let session = parse_session(&raw, &cfg.replay)?;
    let gate = evaluate(session.elapsed_seconds, &cfg.gate);

    let logger = cfg
        .logging
        .path
        .as_ref()
        .map(|path| JsonlLogger::new(path, cfg.logging.max_payload_bytes));
    if let Some(logger) = &logger {
        logger.append_all(&session_events(&session))?;
        logger.append(&gate_event(&session.header.session_id, &gate))?;
    }

    let stored = if cli.save {
        let store = FsSessionStore::new(&cfg.storage.data_dir, runtime.file_system.clone());
        let stored = store.save_transcript(&raw)?;
        if let Some(logger) = &logger {
            logger.append(&saved_event(&stored))?;
        }
        Some(stored)
    } else {
        None
    };

    let report = SessionReport::new(&session, gate);
    if cli.json {
        runtime.terminal.write_line(&report.to_json()?)?;
    } else {
        for line in report.to_lines() {
            runtime.terminal.write_line(&line)?;
        }
    }

    if let Some(stored) = stored {
        runtime.terminal.write_line(&structured_fallback_line(
            &stored.header.session_id,
            "saved",
            &stored.transcript_path.display().to_string(),
        ))?;
    }

    if cli.require_qualified && !gate.qualifies() {
        return Ok(EXIT_TOO_SHORT);
    }
    Ok(0)
}
