//! Google OAuth / OpenID Connect constants
//!
//! Google's published OAuth 2.0 endpoints and the fixed scope set for the
//! migration flow. These values are not secrets — the client ID and secret
//! that identify our application live in the service configuration.

/// Authorization endpoint where the user consents
pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";

/// Token endpoint for authorization-code exchange
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// JWKS document carrying Google's current ID-token signing keys
pub const JWKS_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuer values Google puts in ID tokens (both forms appear in the wild)
pub const ACCEPTED_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

/// Scopes requested by the migration flow.
/// `openid` makes the token endpoint return an ID token alongside the access
/// token; the Drive scope covers the copy call; email/profile feed the
/// operator log so a completed flow can be attributed to an account.
pub const SCOPES: [&str; 4] = [
    "openid",
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];
