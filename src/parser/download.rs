use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::info;
use url::Url;

use super::join_url;
use crate::client::Session;
use crate::error::Result;
use crate::fetch::get_response;
use crate::html::{find_all, find_tag, tag_not_found};
use crate::settings::Settings;

static ARCHIVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".+pdf-a4\.zip$").unwrap());

/// Save the A4 PDF documentation archive under `downloads/`; returns its path.
pub fn download(session: &impl Session, settings: &Settings) -> Result<PathBuf> {
    let downloads_url = join_url(&settings.main_doc_url, "download.html")?;
    let page = get_response(session, &downloads_url)?;
    let href = archive_href(&page.document())?;
    let archive_url = Url::parse(&join_url(&downloads_url, &href)?)?;
    let filename = archive_filename(&archive_url);

    let downloads_dir = settings.downloads_dir();
    fs::create_dir_all(&downloads_dir)?;
    let archive_path = downloads_dir.join(filename);

    let archive = get_response(session, archive_url.as_str())?;
    save(&archive_path, &archive.content)?;
    info!(path = %archive_path.display(), bytes = archive.content.len(), "Archive downloaded and saved");

    Ok(archive_path)
}

fn archive_href(document: &Html) -> Result<String> {
    let table = find_tag(document, "table", &[("class", "docutils")])?;
    find_all(table, "a", &[])
        .into_iter()
        .filter_map(|a| a.value().attr("href"))
        .find(|href| ARCHIVE_RE.is_match(href))
        .map(str::to_string)
        .ok_or_else(|| tag_not_found("a", &[("href", ARCHIVE_RE.as_str())]))
}

fn archive_filename(url: &Url) -> &str {
    url.path().rsplit('/').next().unwrap_or_default()
}

fn save(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

// ── Tests ──
