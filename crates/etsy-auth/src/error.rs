//! Error types for OAuth token operations

/// Errors from the token authority and refresh-token file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid OAuth configuration: {0}")]
    Config(String),

    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] transport::Error),

    #[error("authorization server returned {status}: {body}")]
    AuthServer { status: u16, body: String },

    #[error("invalid token response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
