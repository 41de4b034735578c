//! Authorization-code exchange against the Google token endpoint
//!
//! The callback hands over a short-lived authorization code; this module
//! turns it into usable credentials. One POST with the confidential-client
//! secret in the form body, never in the URL. Codes are single-use at the
//! provider, so a failed exchange is never retried — the user restarts the
//! flow instead.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use common::Secret;
use serde::Deserialize;
use tracing::debug;

use crate::constants::TOKEN_ENDPOINT;
use crate::error::{Error, Result};

/// Raw response from the token endpoint.
///
/// `expires_in` is a delta in seconds from the response time; the exchange
/// client converts it to an absolute unix-millisecond timestamp. Google omits
/// `refresh_token` for `access_type=online` flows, so it is optional, as is
/// `id_token` (absent when the `openid` scope was not granted).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    /// Space-separated scopes the user actually granted
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Credentials produced by a completed exchange.
///
/// `expires_at` is an absolute unix timestamp in milliseconds, computed at
/// exchange time from the response's `expires_in` delta.
#[derive(Debug, Clone)]
pub struct CredentialSet {
    /// Bearer token for Drive API calls
    pub access_token: String,
    /// Signed OpenID Connect identity assertion, verified separately
    pub id_token: Option<String>,
    /// Present only for `access_type=offline` flows
    pub refresh_token: Option<String>,
    /// Scopes the user actually granted (may differ from those requested)
    pub scopes: Vec<String>,
    /// Expiration as unix timestamp in milliseconds
    pub expires_at: u64,
}

/// Client for the authorization-code grant.
pub struct TokenExchangeClient {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
    client_secret: Secret,
    redirect_uri: String,
    timeout: Duration,
}

impl TokenExchangeClient {
    pub fn new(
        http: reqwest::Client,
        client_id: String,
        client_secret: Secret,
        redirect_uri: String,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint: TOKEN_ENDPOINT.to_string(),
            client_id,
            client_secret,
            redirect_uri,
            timeout,
        }
    }

    /// Override the token endpoint (tests point this at a local mock).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Exchange an authorization code for a credential set.
    ///
    /// A non-2xx answer surfaces the provider's status and body so the
    /// operator can tell an `invalid_grant` from a misconfigured client.
    pub async fn exchange(&self, code: &str) -> Result<CredentialSet> {
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::TokenExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))?;

        debug!(
            expires_in = token.expires_in,
            has_id_token = token.id_token.is_some(),
            "authorization code exchanged"
        );
        Ok(into_credential_set(token))
    }
}

/// Convert the endpoint's delta-based response into an absolute credential set.
fn into_credential_set(token: TokenResponse) -> CredentialSet {
    let now_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    CredentialSet {
        access_token: token.access_token,
        id_token: token.id_token,
        refresh_token: token.refresh_token,
        scopes: token
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        expires_at: now_millis + token.expires_in * 1000,
    }
}
