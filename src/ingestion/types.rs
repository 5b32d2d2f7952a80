use thiserror::Error;

/// Why a feed contributed no entries. Always scoped to a single feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid feed url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http status {0}")]
    Status(reqwest::StatusCode),

    #[error("feed parse error: {0}")]
    Parse(String),
}
