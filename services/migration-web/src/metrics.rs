//! Prometheus metrics for the migration flow
//!
//! Two families cover the flow itself (`flow_events_total`) and the
//! upstream Google calls (`upstream_calls_total`,
//! `upstream_call_duration_seconds`). The `ServiceMetrics` struct carries
//! the atomic counters the health endpoint reports without touching the
//! recorder.

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

/// Install the Prometheus recorder and return a handle for rendering.
///
/// Must be called once at startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("upstream_call_duration_seconds".to_string()),
            &[
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
            ],
        )
        .expect("bucket configuration is non-empty")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record a flow lifecycle event (oauth_start, oauth_callback,
/// copy_success, invalid_state, ...).
pub fn record_flow_event(event: &str) {
    metrics::counter!("flow_events_total", "event" => event.to_string()).increment(1);
}

/// Record one call to a Google endpoint with its outcome and latency.
pub fn record_upstream_call(call: &str, outcome: &str, duration: Duration) {
    metrics::counter!(
        "upstream_calls_total",
        "call" => call.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::histogram!("upstream_call_duration_seconds", "call" => call.to_string())
        .record(duration.as_secs_f64());
}

/// Counters surfaced by the health endpoint.
#[derive(Clone)]
pub struct ServiceMetrics {
    pub flows_started: Arc<AtomicU64>,
    pub flows_authenticated: Arc<AtomicU64>,
    pub copies_completed: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            flows_started: Arc::new(AtomicU64::new(0)),
            flows_authenticated: Arc::new(AtomicU64::new(0)),
            copies_completed: Arc::new(AtomicU64::new(0)),
            errors_total: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn recording_without_recorder_does_not_panic() {
        // No recorder installed in this test; calls become no-ops.
        record_flow_event("oauth_start");
        record_upstream_call("token_exchange", "success", Duration::from_millis(42));
    }

    #[test]
    fn service_metrics_counters_start_at_zero() {
        let m = ServiceMetrics::new();
        assert_eq!(m.flows_started.load(Ordering::Relaxed), 0);
        assert_eq!(m.flows_authenticated.load(Ordering::Relaxed), 0);
        assert_eq!(m.copies_completed.load(Ordering::Relaxed), 0);
        assert_eq!(m.errors_total.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn clones_share_counters() {
        let m = ServiceMetrics::new();
        let m2 = m.clone();
        m.flows_started.fetch_add(1, Ordering::Relaxed);
        assert_eq!(m2.flows_started.load(Ordering::Relaxed), 1);
    }

    fn isolated_recorder() -> (
        metrics_exporter_prometheus::PrometheusRecorder,
        PrometheusHandle,
    ) {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full("upstream_call_duration_seconds".to_string()),
                &[
                    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
                ],
            )
            .unwrap()
            .build_recorder();
        let handle = recorder.handle();
        (recorder, handle)
    }

    #[test]
    fn flow_events_render_with_event_label() {
        let (recorder, handle) = isolated_recorder();
        metrics::with_local_recorder(&recorder, || {
            record_flow_event("oauth_start");
            record_flow_event("oauth_start");
            record_flow_event("copy_success");
        });

        let rendered = handle.render();
        assert!(rendered.contains("flow_events_total"));
        assert!(rendered.contains("event=\"oauth_start\""));
        assert!(rendered.contains("event=\"copy_success\""));
    }

    #[test]
    fn upstream_calls_render_counter_and_histogram() {
        let (recorder, handle) = isolated_recorder();
        metrics::with_local_recorder(&recorder, || {
            record_upstream_call("token_exchange", "success", Duration::from_millis(120));
            record_upstream_call("drive_copy", "error", Duration::from_millis(80));
        });

        let rendered = handle.render();
        assert!(rendered.contains("upstream_calls_total"));
        assert!(rendered.contains("call=\"token_exchange\""));
        assert!(rendered.contains("outcome=\"success\""));
        assert!(rendered.contains("call=\"drive_copy\""));
        assert!(rendered.contains("outcome=\"error\""));
        assert!(rendered.contains("upstream_call_duration_seconds_bucket"));
    }

    #[test]
    fn duration_histogram_uses_configured_buckets() {
        let (recorder, handle) = isolated_recorder();
        metrics::with_local_recorder(&recorder, || {
            record_upstream_call("token_exchange", "success", Duration::from_millis(30));
        });

        let rendered = handle.render();
        assert!(rendered.contains("le=\"0.005\""));
        assert!(rendered.contains("le=\"60\""));
        assert!(rendered.contains("le=\"+Inf\""));
    }
}
