use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Prometheus scrape endpoint for pipeline counters and step timings.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Register descriptions for every metric the server and worker record.
pub fn describe_metrics() {
    metrics::describe_counter!("title_jobs_submitted_total", "Title jobs accepted by the API");
    metrics::describe_counter!("title_jobs_completed_total", "Title jobs whose email was sent");
    metrics::describe_counter!("title_jobs_failed_total", "Title jobs that ended in failure");
    metrics::describe_histogram!("pipeline_step_seconds", "Time spent in one pipeline step");
    metrics::describe_counter!(
        "performance_summaries_total",
        "Scheduled performance summaries by outcome"
    );
    metrics::describe_gauge!("event_queue_depth", "Pending events in the queue");
    metrics::describe_gauge!(
        "event_dead_letter_depth",
        "Undecodable events parked in the dead letter list"
    );
}
