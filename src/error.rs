use thiserror::Error;

/// Failure of a single geocoding attempt against one service.
///
/// These never reach callers of the fallback chain: they are logged and the
/// attempt counts as a miss.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} responded with status {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("malformed centroid {0:?}")]
    Centroid(String),

    #[error("invalid service url: {0}")]
    Url(#[from] url::ParseError),
}
