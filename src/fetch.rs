use scraper::Html;
use tracing::{debug, error};

use crate::client::Session;
use crate::error::FetchError;

/// Pages are always decoded as UTF-8, whatever charset the server declares.
pub const ENCODING: &str = "utf-8";

#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub content: Vec<u8>,
    pub text: String,
    pub encoding: &'static str,
}

impl Page {
    pub fn document(&self) -> Html {
        Html::parse_document(&self.text)
    }
}

/// GET `url` and require a 200. Failures are logged before being returned.
pub fn get_response(session: &impl Session, url: &str) -> Result<Page, FetchError> {
    let response = match session.get(url) {
        Ok(r) => r,
        Err(source) => {
            error!(url, error = %source, "Error while loading page");
            return Err(FetchError::Transport {
                url: url.to_string(),
                source,
            });
        }
    };

    if response.status != 200 {
        error!(url, status = response.status, "Error while loading page");
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    let from_cache = response.from_cache;
    let declared = response.header("content-type").map(str::to_string);
    let text = String::from_utf8_lossy(&response.body).into_owned();
    let page = Page {
        url: response.url,
        content: response.body,
        text,
        encoding: ENCODING,
    };
    debug!(
        url = %page.url,
        from_cache,
        content_type = declared.as_deref().unwrap_or("-"),
        encoding = page.encoding,
        bytes = page.content.len(),
        "Page loaded"
    );
    Ok(page)
}

// ── Tests ──
