use thiserror::Error;

/// Failure to obtain a 200 response for a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to load page {url}, response status: {status}")]
    Status { url: String, status: u16 },

    #[error("failed to load page {url}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
}

/// Faults below the HTTP layer: network, body read, or the response cache.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("response cache: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("response cache: {0}")]
    Headers(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("tag not found: <{tag}> {attrs}")]
    TagNotFound { tag: String, attrs: String },

    #[error("<{tag}> has no `{attr}` attribute")]
    MissingAttribute { tag: String, attr: String },

    #[error("no \"All versions\" list found in the documentation sidebar")]
    NoVersionData,

    #[error("row has {found} cells, table header has {expected}")]
    RowArity { expected: usize, found: usize },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = ParserError> = std::result::Result<T, E>;
