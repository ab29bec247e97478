use std::sync::Arc;

use crate::db::jobs::JobRepository;
use crate::db::settings::SummarySettings;
use crate::db::state_store::StateStore;
use crate::services::queue::EventSink;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StateStore>,
    pub jobs: JobRepository,
    pub settings: SummarySettings,
    pub events: Arc<dyn EventSink>,
}

impl AppState {
    pub fn new(store: Arc<dyn StateStore>, events: Arc<dyn EventSink>) -> Self {
        Self {
            jobs: JobRepository::new(store.clone()),
            settings: SummarySettings::new(store.clone()),
            store,
            events,
        }
    }
}
