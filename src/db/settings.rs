//! Scheduler singletons: the channel the daily summary targets and where to
//! send it. Kept in the `scheduler` namespace, apart from job records.

use std::sync::Arc;

use crate::db::state_store::{self, Namespace, StateKey, StateStore, StoreError};
use crate::models::summary::{ChannelInfo, SummaryTarget};

const CHANNEL_INFO_KEY: &str = "channel_info";
const EMAIL_TO_KEY: &str = "email_to";

#[derive(Clone)]
pub struct SummarySettings {
    store: Arc<dyn StateStore>,
}

impl SummarySettings {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, channel: &ChannelInfo, email_to: &str) -> Result<(), StoreError> {
        let store = self.store.as_ref();
        state_store::save(store, &StateKey::new(Namespace::Scheduler, CHANNEL_INFO_KEY), channel)
            .await?;
        state_store::save(
            store,
            &StateKey::new(Namespace::Scheduler, EMAIL_TO_KEY),
            &email_to,
        )
        .await
    }

    /// The stored target, or `None` if either singleton was never set.
    pub async fn load(&self) -> Result<Option<SummaryTarget>, StoreError> {
        let store = self.store.as_ref();
        let channel: Option<ChannelInfo> =
            state_store::load(store, &StateKey::new(Namespace::Scheduler, CHANNEL_INFO_KEY)).await?;
        let email_to: Option<String> =
            state_store::load(store, &StateKey::new(Namespace::Scheduler, EMAIL_TO_KEY)).await?;

        Ok(match (channel, email_to) {
            (Some(channel), Some(email_to)) => Some(SummaryTarget { channel, email_to }),
            (Some(channel), None) => {
                tracing::warn!(channel_id = %channel.channel_id, "Summary channel set without a recipient");
                None
            }
            _ => None,
        })
    }
}
