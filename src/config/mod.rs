use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Optional for worker processes.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string for the state store
    pub database_url: String,

    /// Redis connection string for the event queue
    pub redis_url: String,

    /// Gemini API key
    pub gemini_api_key: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// YouTube Data API v3 key
    pub youtube_api_key: String,

    /// Resend API key
    pub resend_api_key: String,

    /// Verified Resend sender, e.g. "TitleForge <noreply@example.com>"
    pub resend_from_email: String,

    /// Base URL used in links inside outgoing emails
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Six-field cron expression (with seconds) for the performance summary
    #[serde(default = "default_summary_cron")]
    pub summary_cron: String,

    /// Prometheus listener for the worker process
    #[serde(default = "default_worker_metrics_addr")]
    pub worker_metrics_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_summary_cron() -> String {
    "0 0 9 * * *".to_string()
}

fn default_worker_metrics_addr() -> String {
    "0.0.0.0:9091".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
