//! Cron trigger for the performance summary, using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (SUMMARY_CRON, daily 09:00 by default)
//!     │
//!     └─► SummarySettings::load() ─► PerformanceReporter::run(target)
//!             └─► publish yt.performance.ready | yt.performance.error
//! ```

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::db::settings::SummarySettings;
use crate::models::event::{Event, PerformanceErrorPayload};
use crate::pipeline::performance::PerformanceReporter;
use crate::services::queue::EventSink;

/// Run one summary pass: load the stored target, report, publish the outcome.
///
/// Publishes at most one event. An unreadable target is reported as
/// `yt.performance.error`.
pub async fn run_summary_once(
    settings: &SummarySettings,
    reporter: &PerformanceReporter,
    sink: &dyn EventSink,
) {
    let event = match settings.load().await {
        Ok(target) => reporter.run(target.as_ref()).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load summary target");
            Some(Event::PerformanceError(PerformanceErrorPayload {
                error: e.to_string(),
            }))
        }
    };

    let Some(event) = event else {
        return;
    };

    if let Err(e) = sink.publish(&event).await {
        tracing::error!(topic = %event.topic(), error = %e, "Failed to publish summary event");
    }
}

/// Start the summary schedule.
pub async fn start_scheduler(
    cron: &str,
    settings: SummarySettings,
    reporter: Arc<PerformanceReporter>,
    sink: Arc<dyn EventSink>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let summary_job = Job::new_async(cron, move |_uuid, _lock| {
        let settings = settings.clone();
        let reporter = reporter.clone();
        let sink = sink.clone();
        Box::pin(async move {
            tracing::info!("Running scheduled performance summary");
            run_summary_once(&settings, &reporter, sink.as_ref()).await;
        })
    })?;

    scheduler.add(summary_job).await?;
    scheduler.start().await?;

    tracing::info!(cron, "Performance summary scheduler started");
    Ok(scheduler)
}
