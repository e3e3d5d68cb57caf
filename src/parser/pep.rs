use std::collections::BTreeMap;

use scraper::{ElementRef, Html};
use tracing::{info, warn};

use super::{join_url, progress_bar};
use crate::client::Session;
use crate::error::Result;
use crate::fetch::get_response;
use crate::html::{attr, find_all, find_tag, next_element_sibling, tag_not_found, text_of};
use crate::settings::Settings;
use crate::table::ResultTable;

const HEADER: [&str; 2] = ["Status", "Count"];
const TOTAL: &str = "Total";

/// Statuses a PEP may carry, keyed by the status letter of its index code
/// (`SF` → `F`). Codes without a status letter are drafts or active.
pub const EXPECTED_STATUS: &[(&str, &[&str])] = &[
    ("A", &["Active", "Accepted"]),
    ("D", &["Deferred"]),
    ("F", &["Final"]),
    ("P", &["Provisional"]),
    ("R", &["Rejected"]),
    ("S", &["Superseded"]),
    ("W", &["Withdrawn"]),
    ("", &["Draft", "Active"]),
];

pub fn expected_for_letter(letter: &str) -> &'static [&'static str] {
    EXPECTED_STATUS
        .iter()
        .find(|(key, _)| *key == letter)
        .map(|(_, statuses)| *statuses)
        .unwrap_or(&[])
}

/// One numerical-index row: the PEP page and what the index says its status is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub link: String,
    pub expected: Vec<String>,
}

/// Occurrences per status label, iterated in label order.
#[derive(Debug, Default)]
pub struct StatusTally(BTreeMap<String, usize>);

impl StatusTally {
    pub fn add(&mut self, status: &str) {
        *self.0.entry(status.to_string()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// One row per status, then `("Total", sum)`.
    pub fn into_table(self) -> Result<ResultTable> {
        let total = self.total();
        let mut table = ResultTable::new(HEADER);
        for (status, count) in self.0 {
            table.push(vec![status, count.to_string()])?;
        }
        table.push(vec![TOTAL.to_string(), total.to_string()])?;
        Ok(table)
    }
}

pub fn pep(session: &impl Session, settings: &Settings) -> Result<ResultTable> {
    let page = get_response(session, &settings.pep_url)?;
    let entries = index_entries(&page.document(), &settings.pep_url)?;
    info!(count = entries.len(), "PEPs found in numerical index");

    let mut tally = StatusTally::default();
    let pb = progress_bar(entries.len());
    for entry in &entries {
        let card = get_response(session, &entry.link)?;
        let status = card_status(&card.text)?;
        if !entry.expected.contains(&status) {
            pb.suspend(|| {
                warn!(
                    link = %card.url,
                    found = %status,
                    expected = %entry.expected.join(", "),
                    "Mismatched statuses"
                )
            });
        }
        tally.add(&status);
        pb.inc(1);
    }
    pb.finish_and_clear();

    tally.into_table()
}

fn index_entries(document: &Html, base: &str) -> Result<Vec<IndexEntry>> {
    let section = find_tag(document, "section", &[("id", "numerical-index")])?;
    let tbody = find_tag(section, "tbody", &[])?;

    find_all(tbody, "tr", &[])
        .into_iter()
        .map(|tr| -> Result<IndexEntry> {
            let a = find_tag(tr, "a", &[("class", "pep reference internal")])?;
            let expected = find_all(tr, "abbr", &[])
                .into_iter()
                .flat_map(expected_statuses)
                .collect();
            Ok(IndexEntry {
                link: join_url(base, attr(a, "href")?)?,
                expected,
            })
        })
        .collect()
}

/// `title="Standards Track, Final"` → `Final`. Without a title the status
/// letter in the abbreviation text is looked up instead.
fn expected_statuses(abbr: ElementRef) -> Vec<String> {
    if let Some((_kind, status)) = abbr.value().attr("title").and_then(|t| t.split_once(", ")) {
        return vec![status.to_string()];
    }
    let code = text_of(abbr);
    let letter = code.trim().get(1..2).unwrap_or("");
    expected_for_letter(letter)
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Value of the `Status` field in a PEP page's header block.
fn card_status(text: &str) -> Result<String> {
    let document = Html::parse_document(text);
    let fields = find_tag(&document, "dl", &[("class", "rfc2822 field-list simple")])?;
    let label = find_all(fields, "dt", &[])
        .into_iter()
        .find(|dt| dt.text().any(|t| t.trim() == "Status"))
        .ok_or_else(|| tag_not_found("dt", &[("text", "Status")]))?;
    let value = next_element_sibling(label).ok_or_else(|| tag_not_found("dd", &[]))?;
    Ok(text_of(value).trim().to_string())
}

// ── Tests ──
