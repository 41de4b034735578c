//! Flow error taxonomy and HTTP mapping
//!
//! Every failure aborts one flow attempt with a user-visible response; the
//! process itself keeps serving. ID-token verification failure has no
//! variant here on purpose: it is absorbed inside the callback step.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::pages;

/// Failures that abort an individual flow attempt.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Missing, unknown, expired, or already-consumed state token
    #[error("Invalid state parameter; restart the flow from /user.")]
    InvalidState,

    /// Consent denied, no code delivered, or the token endpoint said no
    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    /// Copy requested for a state with no stored credentials
    #[error("Missing token context; restart from /user.")]
    MissingCredentialContext,

    /// The Drive copy call failed; detail comes from the provider
    #[error("copy failed: {0}")]
    CopyFailed(String),
}

impl FlowError {
    /// HTTP status this failure surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            FlowError::InvalidState
            | FlowError::ExchangeFailed(_)
            | FlowError::MissingCredentialContext => StatusCode::BAD_REQUEST,
            FlowError::CopyFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            FlowError::InvalidState => "Invalid state",
            FlowError::ExchangeFailed(_) => "Token exchange failed",
            FlowError::MissingCredentialContext => "Missing token context",
            FlowError::CopyFailed(_) => "Copy failed",
        }
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        (self.status(), pages::error(self.title(), &self.to_string())).into_response()
    }
}
