use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::error;

use crate::client::Session;
use crate::error::{ParserError, Result};
use crate::fetch::get_response;
use crate::html::{attr, find_all, find_tag, text_of};
use crate::settings::Settings;
use crate::table::ResultTable;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)").unwrap()
});

const HEADER: [&str; 3] = ["Documentation link", "Version", "Status"];
const ALL_VERSIONS_MARKER: &str = "All versions";

/// Link text from the versions sidebar, split when it follows
/// `Python <major>.<minor> (<status>)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionText {
    Parsed { version: String, status: String },
    Unparsed { raw: String },
}

impl VersionText {
    pub fn parse(text: &str) -> Self {
        match VERSION_RE.captures(text) {
            Some(caps) => VersionText::Parsed {
                version: caps["version"].to_string(),
                status: caps["status"].to_string(),
            },
            None => VersionText::Unparsed {
                raw: text.to_string(),
            },
        }
    }

    /// `(version, status)` cells; unparsed text keeps the raw label and an empty status.
    pub fn into_cells(self) -> (String, String) {
        match self {
            VersionText::Parsed { version, status } => (version, status),
            VersionText::Unparsed { raw } => (raw, String::new()),
        }
    }
}

pub fn latest_versions(session: &impl Session, settings: &Settings) -> Result<ResultTable> {
    let page = get_response(session, &settings.main_doc_url)?;
    extract(&page.document())
}

fn extract(document: &Html) -> Result<ResultTable> {
    let sidebar = find_tag(document, "div", &[("class", "sphinxsidebarwrapper")])?;

    // First list carrying the marker wins; later lists are never looked at.
    let versions = find_all(sidebar, "ul", &[])
        .into_iter()
        .find(|ul| text_of(*ul).contains(ALL_VERSIONS_MARKER))
        .ok_or_else(|| {
            error!(marker = ALL_VERSIONS_MARKER, "Versions list not found in sidebar");
            ParserError::NoVersionData
        })?;

    let mut results = ResultTable::new(HEADER);
    for a in find_all(versions, "a", &[]) {
        let link = attr(a, "href")?.to_string();
        let (version, status) = VersionText::parse(&text_of(a)).into_cells();
        results.push(vec![link, version, status])?;
    }
    Ok(results)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::StubSession;
    use crate::output::render_plain;

    fn sidebar(lists: &str) -> String {
        format!(
            r#"<html><body><div class="sphinxsidebar"><div class="sphinxsidebarwrapper">{lists}</div></div></body></html>"#
        )
    }

    #[test]
    fn parses_version_and_status() {
        assert_eq!(
            VersionText::parse("Python 3.11 (stable)"),
            VersionText::Parsed {
                version: "3.11".into(),
                status: "stable".into()
            }
        );
        assert_eq!(
            VersionText::parse("Python 3.11 (stable)").into_cells(),
            ("3.11".to_string(), "stable".to_string())
        );
    }

    #[test]
    fn unmatched_text_is_kept_raw() {
        let v = VersionText::parse("Python 3.x");
        assert_eq!(v, VersionText::Unparsed { raw: "Python 3.x".into() });
        assert_eq!(v.into_cells(), ("Python 3.x".to_string(), String::new()));
    }

    #[test]
    fn status_may_contain_spaces() {
        let (version, status) = VersionText::parse("Python 3.14 (in development)").into_cells();
        assert_eq!(version, "3.14");
        assert_eq!(status, "in development");
    }

    #[test]
    fn extracts_rows_from_fixture() {
        let session = StubSession::new().fixture("https://docs.python.org/3/", "docs_index.html");
        let table = latest_versions(&session, &Settings::default()).unwrap();

        assert_eq!(table.header(), HEADER);
        let rows = table.records();
        assert_eq!(rows[0], ["https://docs.python.org/3.14/", "3.14", "in development"]);
        assert_eq!(rows[1], ["https://docs.python.org/3.13/", "3.13", "stable"]);
        let last = rows.last().unwrap();
        assert_eq!(last, &["https://www.python.org/doc/versions/", "All versions", ""]);
    }

    #[test]
    fn first_matching_list_wins() {
        let html = sidebar(
            r#"<ul><li><a href="/other">Other resources</a></li></ul>
               <ul><li><a href="/3.13/">Python 3.13 (stable)</a></li><li><a href="/all/">All versions</a></li></ul>
               <ul><li><a href="/3.1/">Python 3.1 (old)</a></li><li><a href="/all/">All versions</a></li></ul>"#,
        );
        let table = extract(&Html::parse_document(&html)).unwrap();
        assert_eq!(table.records().len(), 2);
        assert_eq!(table.records()[0][1], "3.13");
    }

    #[test]
    fn missing_versions_list_is_typed_error() {
        let html = sidebar(r#"<ul><li><a href="/x">Nothing here</a></li></ul>"#);
        let err = extract(&Html::parse_document(&html)).unwrap_err();
        assert!(matches!(err, ParserError::NoVersionData));
    }

    #[test]
    fn missing_sidebar_is_tag_error() {
        let err = extract(&Html::parse_document("<html><body></body></html>")).unwrap_err();
        assert!(matches!(err, ParserError::TagNotFound { .. }));
    }

    #[test]
    fn repeated_runs_render_identically() {
        let session = StubSession::new().fixture("https://docs.python.org/3/", "docs_index.html");
        let settings = Settings::default();
        let first = render_plain(&latest_versions(&session, &settings).unwrap());
        let second = render_plain(&latest_versions(&session, &settings).unwrap());
        assert_eq!(first, second);
    }
}
