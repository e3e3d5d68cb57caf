mod cache;
mod client;
mod error;
mod fetch;
mod html;
mod output;
mod parser;
mod settings;
mod table;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use client::CachedSession;
use output::OutputMode;
use parser::{Mode, RunOutcome};
use settings::Settings;

const LOG_BACKUP_COUNT: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "docs_scraper", about = "Python documentation and PEP index scraper")]
struct Cli {
    /// Parser mode
    #[arg(value_enum)]
    mode: Mode,
    /// Clear the HTTP response cache before running
    #[arg(short, long)]
    clear_cache: bool,
    /// How to present the results
    #[arg(short, long, value_enum, default_value = "plain")]
    output: OutputMode,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings");
    let _guard = init_tracing(&log_dir(&settings));

    let t0 = Instant::now();
    info!("Parser started");
    info!(args = ?cli, "Command line arguments");

    match settings.and_then(|settings| run(&cli, &settings)) {
        Ok(()) => {
            info!(elapsed_s = t0.elapsed().as_secs_f64(), "Parser finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Parser failed");
            ExitCode::FAILURE
        }
    }
}

/// Settings that failed to load still get logged, under the default location.
fn log_dir(settings: &Result<Settings>) -> PathBuf {
    match settings {
        Ok(settings) => settings.logs_dir(),
        Err(_) => Settings::default().logs_dir(),
    }
}

fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let session = CachedSession::new(settings)?;
    if cli.clear_cache {
        let dropped = session.clear_cache()?;
        info!(entries = dropped, "Response cache cleared");
    }

    match parser::run(cli.mode, &session, settings)? {
        RunOutcome::Table(table) => {
            output::control_output(&table, cli.output, cli.mode, &settings.results_dir())?
        }
        RunOutcome::Saved(path) => debug!(path = %path.display(), "Nothing to render"),
    }
    Ok(())
}

/// Log to stderr and to a daily-rotated `parser.log` under `logs_dir`.
/// The returned guard must live until exit so buffered lines are flushed.
fn init_tracing(logs_dir: &Path) -> Option<WorkerGuard> {
    let env_filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let appender = std::fs::create_dir_all(logs_dir)
        .map_err(|e| e.to_string())
        .and_then(|_| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("parser")
                .filename_suffix("log")
                .max_log_files(LOG_BACKUP_COUNT)
                .build(logs_dir)
                .map_err(|e| e.to_string())
        });

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(env_filter())
                .with(stderr_layer)
                .with(fmt::layer().with_target(false).with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(stderr_layer)
                .init();
            warn!(error = %e, "Failed to open log file; logging to stderr only");
            None
        }
    }
}
