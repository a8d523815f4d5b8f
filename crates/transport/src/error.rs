//! Error types for HTTP transport operations

/// Errors from sending a request. Non-2xx responses are not errors here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Send(String),

    #[error("reading response body failed: {0}")]
    Body(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;
