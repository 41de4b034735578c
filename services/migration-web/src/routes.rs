//! HTTP routes for the migration portal
//!
//! Thin handlers over the flow steps in `flow`: they pull parameters out of
//! the request, run the step, and translate the outcome into a redirect or
//! an error page. Everything stateful lives behind `AppState`.

use std::sync::atomic::Ordering;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;

use crate::flow::{self, CallbackParams, FlowState};
use crate::pages;

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub flow: FlowState,
    pub prometheus: PrometheusHandle,
}

/// Build the axum router with all routes and shared state.
pub fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/", get(landing_handler))
        .route("/admin", get(admin_handler))
        .route("/user", get(user_handler))
        .route("/oauth2/start", post(start_handler))
        .route("/oauth2/callback", get(callback_handler))
        .route("/copy", get(copy_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

fn request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

async fn landing_handler() -> Html<String> {
    pages::landing()
}

async fn admin_handler(State(state): State<AppState>) -> Html<String> {
    pages::admin(
        &state.flow.source_file_id,
        &state.flow.destination_folder_id,
        &state.flow.redirect_uri,
    )
}

async fn user_handler() -> Html<String> {
    pages::user()
}

/// POST /oauth2/start — flow step 1: redirect the browser to Google.
async fn start_handler(State(state): State<AppState>) -> Redirect {
    let url = flow::start(&state.flow, &request_id()).await;
    Redirect::to(&url)
}

/// GET /oauth2/callback — flow step 2: exchange the code, then send the
/// browser on to the copy step with its state token.
async fn callback_handler(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match flow::complete_callback(&state.flow, params, &request_id()).await {
        Ok(outcome) => Redirect::to(&format!("/copy?state={}", outcome.state)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
struct CopyQuery {
    #[serde(default)]
    state: Option<String>,
}

/// GET /copy — flow step 3: run the gated copy for an authenticated flow.
async fn copy_handler(State(state): State<AppState>, Query(query): Query<CopyQuery>) -> Response {
    let token = query.state.unwrap_or_default();
    match flow::run_copy(&state.flow, &token, &request_id()).await {
        Ok(copied) => pages::copy_success(&copied).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Health check endpoint with flow counters and store sizes.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = &state.flow.metrics;
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": metrics.started_at.elapsed().as_secs(),
        "flows_started": metrics.flows_started.load(Ordering::Relaxed),
        "flows_authenticated": metrics.flows_authenticated.load(Ordering::Relaxed),
        "copies_completed": metrics.copies_completed.load(Ordering::Relaxed),
        "errors_total": metrics.errors_total.load(Ordering::Relaxed),
        "pending_states": state.flow.states.len().await,
        "stored_credentials": state.flow.credentials.len().await,
    });

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint — returns metrics in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.prometheus.render(),
    )
}
