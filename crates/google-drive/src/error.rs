//! Error types for Drive operations

/// Errors from Drive operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("drive copy failed ({status}): {detail}")]
    Copy { status: u16, detail: String },
}

/// Result alias for Drive operations.
pub type Result<T> = std::result::Result<T, Error>;
