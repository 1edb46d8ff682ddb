//! Errors raised while talking to the CMS

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("malformed response from {url}: {source}")]
    Parse {
        url: String,
        source: serde_json::Error,
    },
    #[error("invalid cursor {cursor:?}: {source}")]
    InvalidCursor {
        cursor: String,
        source: url::ParseError,
    },
    #[error("CMS api at {0} has no master ref")]
    MissingRef(String),
}

impl FetchError {
    /// Parse failures and transport failures are reported the same way to
    /// readers, but logs keep them apart.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Status { .. } => "status",
            FetchError::Parse { .. } => "parse",
            FetchError::InvalidCursor { .. } => "cursor",
            FetchError::MissingRef(_) => "api",
        }
    }
}
