//! Flow orchestration: the three steps of the migration flow
//!
//! Each step arrives as its own inbound request, so the orchestrator keeps
//! no per-flow fields. The state token is the flow identifier; everything a
//! step needs is rehydrated from the state registry and credential store.
//!
//! Step ordering is enforced by the stores themselves: the callback only
//! proceeds past a token that the registry validates and consumes, and the
//! copy only runs with credentials the store still holds.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use google_auth::{
    AccessType, CredentialStore, IdentityVerifier, StateRegistry, TokenExchangeClient,
    build_authorization_url,
};
use google_drive::{CopiedFile, DriveClient};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::error::FlowError;
use crate::metrics::{ServiceMetrics, record_flow_event, record_upstream_call};

/// Everything the flow steps need, shared across handlers.
#[derive(Clone)]
pub struct FlowState {
    pub states: Arc<StateRegistry>,
    pub credentials: Arc<CredentialStore>,
    pub exchange: Arc<TokenExchangeClient>,
    pub verifier: Arc<IdentityVerifier>,
    pub drive: Arc<DriveClient>,
    pub client_id: String,
    pub redirect_uri: String,
    pub access_type: AccessType,
    pub source_file_id: String,
    pub destination_folder_id: String,
    pub metrics: ServiceMetrics,
}

/// Query parameters Google sends to the callback endpoint.
///
/// `error` arrives instead of `code` when the user denies consent.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// What a completed callback hands back to the handler.
#[derive(Debug)]
pub struct CallbackOutcome {
    pub state: String,
    pub email: Option<String>,
    pub scopes: Vec<String>,
}

/// Step 1: mint a state token and build the consent URL to redirect to.
#[instrument(skip_all, fields(request_id = %request_id))]
pub async fn start(flow: &FlowState, request_id: &str) -> String {
    let state = flow.states.issue().await;
    let request =
        build_authorization_url(&flow.client_id, &flow.redirect_uri, flow.access_type, &state);

    flow.metrics.flows_started.fetch_add(1, Ordering::Relaxed);
    record_flow_event("oauth_start");
    info!(state, url = %request.url, "oauth flow started");

    request.url
}

/// Step 2: validate the callback, exchange the code, store credentials.
///
/// State validation runs first and consumes the token, so nothing reaches
/// the token endpoint for an unknown or replayed state. Consent denial and
/// a missing code also land after consumption; the user restarts from
/// /user either way. ID-token verification failure is logged and absorbed:
/// identity is informational, authorization already happened at the
/// exchange.
#[instrument(skip_all, fields(request_id = %request_id))]
pub async fn complete_callback(
    flow: &FlowState,
    params: CallbackParams,
    request_id: &str,
) -> Result<CallbackOutcome, FlowError> {
    let state = params.state.unwrap_or_default();
    if !flow.states.validate_and_consume(&state).await {
        flow.metrics.errors_total.fetch_add(1, Ordering::Relaxed);
        record_flow_event("invalid_state");
        warn!(state, "callback rejected: invalid state");
        return Err(FlowError::InvalidState);
    }

    if let Some(error) = params.error {
        flow.metrics.errors_total.fetch_add(1, Ordering::Relaxed);
        record_flow_event("exchange_failed");
        warn!(state, error, "callback carried a provider error");
        return Err(FlowError::ExchangeFailed(format!(
            "provider returned error: {error}"
        )));
    }
    let code = match params.code {
        Some(code) if !code.is_empty() => code,
        _ => {
            flow.metrics.errors_total.fetch_add(1, Ordering::Relaxed);
            record_flow_event("exchange_failed");
            warn!(state, "callback carried no authorization code");
            return Err(FlowError::ExchangeFailed(
                "callback carried no authorization code".to_string(),
            ));
        }
    };

    let started = Instant::now();
    let credentials = match flow.exchange.exchange(&code).await {
        Ok(credentials) => {
            record_upstream_call("token_exchange", "success", started.elapsed());
            credentials
        }
        Err(e) => {
            record_upstream_call("token_exchange", "error", started.elapsed());
            flow.metrics.errors_total.fetch_add(1, Ordering::Relaxed);
            record_flow_event("exchange_failed");
            warn!(state, error = %e, "token exchange failed");
            let detail = match e {
                google_auth::Error::TokenExchange(detail)
                | google_auth::Error::Http(detail) => detail,
                other => other.to_string(),
            };
            return Err(FlowError::ExchangeFailed(detail));
        }
    };

    let email = match flow.verifier.verify(credentials.id_token.as_deref()).await {
        Ok(claims) => claims.email,
        Err(e) => {
            record_flow_event("id_token_verify_failed");
            warn!(state, error = %e, "id_token verification failed; continuing without identity");
            None
        }
    };

    let scopes = credentials.scopes.clone();
    flow.credentials.put(state.clone(), credentials).await;
    flow.metrics.flows_authenticated.fetch_add(1, Ordering::Relaxed);
    record_flow_event("oauth_callback");
    info!(
        state,
        email = email.as_deref().unwrap_or(""),
        scopes = ?scopes,
        "oauth callback completed"
    );

    Ok(CallbackOutcome {
        state,
        email,
        scopes,
    })
}

/// Step 3: look up the flow's credentials and run the gated copy.
///
/// The copy is not idempotent; it runs at most once per request and is
/// never retried here. Credential reads do not consume, so a browser
/// refresh produces another copy with the same stored token.
#[instrument(skip_all, fields(request_id = %request_id))]
pub async fn run_copy(
    flow: &FlowState,
    state_token: &str,
    request_id: &str,
) -> Result<CopiedFile, FlowError> {
    let Some(credentials) = flow.credentials.get(state_token).await else {
        flow.metrics.errors_total.fetch_add(1, Ordering::Relaxed);
        record_flow_event("missing_credentials");
        warn!("copy requested without stored credentials");
        return Err(FlowError::MissingCredentialContext);
    };

    let started = Instant::now();
    match flow
        .drive
        .copy_file(
            credentials.access_token.as_str(),
            &flow.source_file_id,
            &flow.destination_folder_id,
        )
        .await
    {
        Ok(copied) => {
            record_upstream_call("drive_copy", "success", started.elapsed());
            flow.metrics.copies_completed.fetch_add(1, Ordering::Relaxed);
            record_flow_event("copy_success");
            info!(
                new_file_id = %copied.id,
                name = copied.name.as_deref().unwrap_or(""),
                "copy succeeded"
            );
            Ok(copied)
        }
        Err(e) => {
            record_upstream_call("drive_copy", "error", started.elapsed());
            flow.metrics.errors_total.fetch_add(1, Ordering::Relaxed);
            record_flow_event("copy_failed");
            warn!(error = %e, "copy failed");
            let detail = match e {
                google_drive::Error::Copy { status, detail } => {
                    format!("provider returned {status}: {detail}")
                }
                google_drive::Error::Http(detail) => detail,
            };
            Err(FlowError::CopyFailed(detail))
        }
    }
}
