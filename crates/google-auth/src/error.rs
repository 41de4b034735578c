//! Error types for OAuth flow operations

/// Errors from OAuth flow operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("identity token invalid: {0}")]
    IdentityToken(String),
}

/// Result alias for flow operations.
pub type Result<T> = std::result::Result<T, Error>;
