//! Error types for authorized Etsy API calls

/// Errors from the authorizer and the resource client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Obtaining a fresh access token failed. The cached token state is
    /// unchanged and no request was sent.
    #[error("access token refresh failed: {0}")]
    TokenRefresh(#[source] etsy_auth::Error),

    #[error("deadline exceeded while authorizing request")]
    DeadlineExceeded,

    #[error("transport error: {0}")]
    Transport(#[from] transport::Error),

    #[error("Etsy API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid API response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
