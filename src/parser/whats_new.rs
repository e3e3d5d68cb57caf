use scraper::Html;
use tracing::info;

use super::{join_url, progress_bar};
use crate::client::Session;
use crate::error::Result;
use crate::fetch::get_response;
use crate::html::{attr, find_all, find_tag, text_of};
use crate::settings::Settings;
use crate::table::ResultTable;

const HEADER: [&str; 3] = ["Link to article", "Title", "Editor, author"];

/// One row per "What's New" release page: link, page title, editors.
pub fn whats_new(session: &impl Session, settings: &Settings) -> Result<ResultTable> {
    let whats_new_url = join_url(&settings.main_doc_url, "whatsnew/")?;
    let page = get_response(session, &whats_new_url)?;
    let links = version_links(&page.document(), &whats_new_url)?;
    info!(count = links.len(), "release pages found");

    let mut results = ResultTable::new(HEADER);
    let pb = progress_bar(links.len());
    for link in links {
        let page = get_response(session, &link)?;
        let (title, editors) = parse_release_page(&page.text)?;
        results.push(vec![link, title, editors])?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(results)
}

fn version_links(document: &Html, base: &str) -> Result<Vec<String>> {
    let main_section = find_tag(document, "section", &[("id", "what-s-new-in-python")])?;
    let toctree = find_tag(main_section, "div", &[("class", "toctree-wrapper")])?;

    find_all(toctree, "li", &[("class", "toctree-l1")])
        .into_iter()
        .map(|item| {
            let anchor = find_tag(item, "a", &[])?;
            join_url(base, attr(anchor, "href")?)
        })
        .collect()
}

/// Page title and the flattened text of the first definition list.
fn parse_release_page(text: &str) -> Result<(String, String)> {
    let document = Html::parse_document(text);
    let h1 = find_tag(&document, "h1", &[])?;
    let dl = find_tag(&document, "dl", &[])?;
    Ok((text_of(h1), text_of(dl).replace('\n', " ")))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::StubSession;
    use crate::error::{FetchError, ParserError};

    const INDEX: &str = "https://docs.python.org/3/whatsnew/";

    #[test]
    fn builds_one_row_per_release() {
        let session = StubSession::new()
            .fixture(INDEX, "whatsnew_index.html")
            .fixture(&format!("{INDEX}3.12.html"), "whatsnew_3_12.html")
            .fixture(&format!("{INDEX}3.11.html"), "whatsnew_3_11.html");

        let table = whats_new(&session, &Settings::default()).unwrap();
        assert_eq!(table.header(), HEADER);
        assert_eq!(table.records().len(), 2);

        let first = &table.records()[0];
        assert_eq!(first[0], "https://docs.python.org/3/whatsnew/3.12.html");
        assert_eq!(first[1], "What’s New In Python 3.12");
        assert!(!first[2].contains('\n'));
        assert!(first[2].contains("Adam Turner"));
    }

    #[test]
    fn editor_text_is_flattened() {
        let (title, editors) =
            parse_release_page("<h1>T</h1><dl><dt>Editor</dt>\n<dd>A\nB</dd></dl>").unwrap();
        assert_eq!(title, "T");
        assert_eq!(editors, "Editor A B");
    }

    #[test]
    fn missing_index_section_aborts() {
        let session = StubSession::new().page(INDEX, "<html><body><p>moved</p></body></html>");
        let err = whats_new(&session, &Settings::default()).unwrap_err();
        assert!(matches!(err, ParserError::TagNotFound { ref tag, .. } if tag == "section"));
    }

    #[test]
    fn failed_sub_page_discards_everything() {
        let session = StubSession::new()
            .fixture(INDEX, "whatsnew_index.html")
            .fixture(&format!("{INDEX}3.12.html"), "whatsnew_3_12.html")
            .status(&format!("{INDEX}3.11.html"), 500);

        let err = whats_new(&session, &Settings::default()).unwrap_err();
        assert!(matches!(err, ParserError::Fetch(FetchError::Status { status: 500, .. })));
        // No retries: index, 3.12, then the failing 3.11 page
        assert_eq!(session.requested.borrow().len(), 3);
    }
}
