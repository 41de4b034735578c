//! Google OAuth 2.0 authorization-code flow primitives
//!
//! Implements the pieces of the web-server OAuth flow that the migration
//! service composes: anti-forgery state tokens, consent-URL construction,
//! authorization-code exchange, ID-token verification, and short-lived
//! credential storage. This crate is a standalone library with no dependency
//! on the web binary — it can be tested and used independently.
//!
//! Flow:
//! 1. `StateRegistry::issue()` creates a single-use state token
//! 2. User authorizes via the URL from `authorize::build_authorization_url()`
//! 3. Callback proves freshness via `StateRegistry::validate_and_consume()`
//! 4. `TokenExchangeClient::exchange()` turns the code into a `CredentialSet`
//! 5. `IdentityVerifier::verify()` checks the ID token against Google's JWKS
//! 6. `CredentialStore::put()` parks the credentials for the copy step

pub mod authorize;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod state;
pub mod token;

pub use authorize::{AccessType, AuthorizationRequest, build_authorization_url};
pub use constants::*;
pub use credentials::CredentialStore;
pub use error::{Error, Result};
pub use identity::{Claims, IdentityVerifier};
pub use state::StateRegistry;
pub use token::{CredentialSet, TokenExchangeClient, TokenResponse};
