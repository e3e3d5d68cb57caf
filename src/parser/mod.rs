pub mod download;
pub mod latest_versions;
pub mod pep;
pub mod whats_new;

use std::path::PathBuf;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::client::Session;
use crate::error::Result;
use crate::settings::Settings;
use crate::table::ResultTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    WhatsNew,
    LatestVersions,
    Download,
    Pep,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::WhatsNew => "whats-new",
            Mode::LatestVersions => "latest-versions",
            Mode::Download => "download",
            Mode::Pep => "pep",
        }
    }
}

/// What a mode produced: a table to render, or a file already written.
#[derive(Debug)]
pub enum RunOutcome {
    Table(ResultTable),
    Saved(PathBuf),
}

pub fn run(mode: Mode, session: &impl Session, settings: &Settings) -> Result<RunOutcome> {
    let outcome = match mode {
        Mode::WhatsNew => RunOutcome::Table(whats_new::whats_new(session, settings)?),
        Mode::LatestVersions => {
            RunOutcome::Table(latest_versions::latest_versions(session, settings)?)
        }
        Mode::Download => RunOutcome::Saved(download::download(session, settings)?),
        Mode::Pep => RunOutcome::Table(pep::pep(session, settings)?),
    };
    Ok(outcome)
}

/// Resolve `href` against `base` the way a browser would.
pub fn join_url(base: &str, href: &str) -> Result<String> {
    Ok(Url::parse(base)?.join(href)?.to_string())
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
