use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

use titleforge::{
    config::AppConfig,
    db::{self, jobs::JobRepository, settings::SummarySettings, state_store::PgStateStore},
    pipeline::{self, Collaborators, Pipeline},
    routes::metrics::describe_metrics,
    scheduler,
    services::{
        email::ResendClient,
        gemini::GeminiClient,
        queue::{EventQueue, QueueError},
        youtube::YouTubeClient,
    },
};

const POLL_INTERVAL_MS: u64 = 1000; // 1 second

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting titleforge pipeline worker");

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let metrics_addr: SocketAddr = config
        .worker_metrics_addr
        .parse()
        .expect("Invalid WORKER_METRICS_ADDR");
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .expect("Failed to install Prometheus exporter");
    describe_metrics();

    tracing::info!("Connecting to PostgreSQL");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");
    let store = Arc::new(PgStateStore::new(db_pool));

    let queue = Arc::new(EventQueue::new(&config.redis_url).expect("Failed to initialize event queue"));

    tracing::info!("Initializing upstream clients");
    let collaborators = Collaborators {
        jobs: JobRepository::new(store.clone()),
        platform: Arc::new(YouTubeClient::new(config.youtube_api_key.clone())),
        generator: Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        )),
        mailer: Arc::new(ResendClient::new(
            config.resend_api_key.clone(),
            config.resend_from_email.clone(),
        )),
        public_base_url: config.public_base_url.clone(),
    };

    let pipeline =
        pipeline::build_pipeline(&collaborators).expect("Pipeline wiring is incomplete");

    let _scheduler = scheduler::start_scheduler(
        &config.summary_cron,
        SummarySettings::new(store),
        Arc::new(pipeline::performance_reporter(&collaborators)),
        queue.clone(),
    )
    .await
    .expect("Failed to start summary scheduler");

    tracing::info!("Worker ready, starting event processing loop");

    loop {
        match process_next_event(&pipeline, &queue).await {
            Ok(true) => {
                tracing::debug!("Event processed, checking for next event");
            }
            Ok(false) => {
                tracing::trace!("No events available, sleeping");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error processing event, will retry");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
        }
    }
}

/// Dispatch the next queued event and publish whatever its subscribers emit.
/// Returns Ok(true) if an event was processed, Ok(false) if the queue was empty.
async fn process_next_event(pipeline: &Pipeline, queue: &EventQueue) -> Result<bool, QueueError> {
    if let Ok(depth) = queue.queue_depth().await {
        metrics::gauge!("event_queue_depth").set(depth as f64);
    }
    if let Ok(depth) = queue.dead_letter_depth().await {
        metrics::gauge!("event_dead_letter_depth").set(depth as f64);
    }

    let Some(delivery) = queue.dequeue().await? else {
        return Ok(false);
    };

    let topic = delivery.event.topic();
    tracing::info!(topic = %topic, job_id = ?delivery.event.job_id(), "Dispatching event");

    pipeline.relay(&delivery.event, queue).await;
    queue.complete(&delivery).await?;
    Ok(true)
}
