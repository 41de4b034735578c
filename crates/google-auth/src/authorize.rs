//! Authorization URL construction
//!
//! Builds the Google consent URL the user is redirected to at the start of
//! the flow. Pure string assembly — no I/O, no clock, no randomness. The
//! state token ties the eventual callback back to the flow instance that
//! minted it.

use serde::Deserialize;

use crate::constants::{AUTHORIZATION_ENDPOINT, SCOPES};

/// Whether to ask Google for a refresh token alongside the access token.
///
/// `online` (the default) returns no refresh token, which is all the
/// migration flow needs; `offline` requests one for long-lived access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    #[default]
    Online,
    Offline,
}

impl AccessType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessType::Online => "online",
            AccessType::Offline => "offline",
        }
    }
}

/// A fully assembled authorization request.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Complete consent URL to redirect the user to
    pub url: String,
    /// Scopes encoded into the URL
    pub scopes: Vec<String>,
}

/// Build the Google authorization URL with all flow parameters.
///
/// `prompt=select_account` forces the account chooser so a user signed in to
/// several Google accounts picks the right source account;
/// `include_granted_scopes=true` folds previously granted scopes into the
/// new grant. The state token is URL-safe by construction and goes in raw.
pub fn build_authorization_url(
    client_id: &str,
    redirect_uri: &str,
    access_type: AccessType,
    state: &str,
) -> AuthorizationRequest {
    let scope = SCOPES.join(" ");
    let url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type={}&prompt=select_account&include_granted_scopes=true",
        AUTHORIZATION_ENDPOINT,
        urlencoded(client_id),
        urlencoded(redirect_uri),
        urlencoded(&scope),
        state,
        access_type.as_str(),
    );

    AuthorizationRequest {
        url,
        scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Minimal URL encoding for parameter values.
/// Only encodes characters that occur in our parameter values and would
/// break URL parameter parsing. `%` must be first.
fn urlencoded(s: &str) -> String {
    s.replace('%', "%25")
        .replace(' ', "%20")
        .replace(':', "%3A")
        .replace('/', "%2F")
        .replace('?', "%3F")
        .replace('&', "%26")
        .replace('=', "%3D")
        .replace('+', "%2B")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
    const REDIRECT_URI: &str = "http://localhost:8080/oauth2/callback";

    #[test]
    fn url_contains_required_params() {
        let request =
            build_authorization_url(CLIENT_ID, REDIRECT_URI, AccessType::Online, "state-abc-123");

        assert!(request.url.starts_with(AUTHORIZATION_ENDPOINT));
        assert!(request.url.contains("client_id=test-client.apps.googleusercontent.com"));
        assert!(request.url.contains("response_type=code"));
        assert!(request.url.contains("state=state-abc-123"));
        assert!(request.url.contains("access_type=online"));
        assert!(request.url.contains("prompt=select_account"));
        assert!(request.url.contains("include_granted_scopes=true"));
    }

    #[test]
    fn redirect_uri_is_encoded() {
        let request =
            build_authorization_url(CLIENT_ID, REDIRECT_URI, AccessType::Online, "s1");

        assert!(
            request
                .url
                .contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Foauth2%2Fcallback"),
            "got: {}",
            request.url
        );
    }

    #[test]
    fn scope_covers_openid_and_drive() {
        let request = build_authorization_url(CLIENT_ID, REDIRECT_URI, AccessType::Online, "s1");

        assert!(request.url.contains(
            "scope=openid%20https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive%20"
        ));
        assert_eq!(request.scopes.len(), SCOPES.len());
        assert!(request.scopes.iter().any(|s| s == "openid"));
        assert!(
            request
                .scopes
                .iter()
                .any(|s| s == "https://www.googleapis.com/auth/drive")
        );
    }

    #[test]
    fn offline_access_type_is_respected() {
        let request = build_authorization_url(CLIENT_ID, REDIRECT_URI, AccessType::Offline, "s1");
        assert!(request.url.contains("access_type=offline"));
    }

    #[test]
    fn builder_is_deterministic() {
        let a = build_authorization_url(CLIENT_ID, REDIRECT_URI, AccessType::Online, "same-state");
        let b = build_authorization_url(CLIENT_ID, REDIRECT_URI, AccessType::Online, "same-state");
        assert_eq!(a.url, b.url, "same inputs must produce the same URL");
    }

    #[test]
    fn distinct_states_produce_distinct_urls() {
        let a = build_authorization_url(CLIENT_ID, REDIRECT_URI, AccessType::Online, "state-a");
        let b = build_authorization_url(CLIENT_ID, REDIRECT_URI, AccessType::Online, "state-b");
        assert_ne!(a.url, b.url);
        assert!(a.url.contains("state=state-a"));
        assert!(b.url.contains("state=state-b"));
    }

    #[test]
    fn access_type_parses_from_config_values() {
        assert_eq!(
            serde_json::from_str::<AccessType>("\"online\"").unwrap(),
            AccessType::Online
        );
        assert_eq!(
            serde_json::from_str::<AccessType>("\"offline\"").unwrap(),
            AccessType::Offline
        );
        assert!(serde_json::from_str::<AccessType>("\"both\"").is_err());
    }
}
