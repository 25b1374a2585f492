//! Metrics collection and exposition.
//!
//! # Metrics
//! - `driver_care_http_requests_total` (counter): requests by method, status
//! - `driver_care_http_request_duration_seconds` (histogram): latency by method
//! - `driver_care_task_runs_total` (counter): scheduled task runs by task, outcome
//! - `driver_care_task_duration_seconds` (histogram): task run time by task
//! - `driver_care_ws_clients` (gauge): connected WebSocket clients
//! - `driver_care_records_stored` (gauge): telemetry rows held in storage
//!
//! Recording is always on; without an installed exporter the calls are no-ops.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(Matcher::Suffix("duration_seconds".to_string()), LATENCY_BUCKETS)?
        .add_global_label("service", "driver-care")
        .install()?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    counter!(
        "driver_care_http_requests_total",
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("driver_care_http_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

/// Record one run of a scheduled task.
pub fn record_task_run(task: &'static str, success: bool, start: Instant) {
    let outcome = if success { "ok" } else { "error" };
    counter!("driver_care_task_runs_total", "task" => task, "outcome" => outcome).increment(1);
    histogram!("driver_care_task_duration_seconds", "task" => task)
        .record(start.elapsed().as_secs_f64());
}

/// Track WebSocket client connect (+1) and disconnect (-1).
pub fn record_ws_client(delta: f64) {
    gauge!("driver_care_ws_clients").increment(delta);
}

/// Record the number of telemetry rows currently stored.
pub fn record_stored_records(count: usize) {
    gauge!("driver_care_records_stored").set(count as f64);
}
