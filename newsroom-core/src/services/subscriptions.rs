//! Category subscription membership.
//!
//! Both operations are idempotent by construction and report an
//! informational outcome instead of failing on a no-op.

use tracing::info;
use uuid::Uuid;

use crate::common::error::Result;
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Unsubscribed,
    NotSubscribed,
}

pub async fn subscribe(
    storage: &dyn Storage,
    user_id: Uuid,
    category_id: Uuid,
) -> Result<SubscribeOutcome> {
    if storage.add_subscriber(category_id, user_id).await? {
        info!(user = %user_id, category = %category_id, "Subscribed");
        Ok(SubscribeOutcome::Subscribed)
    } else {
        Ok(SubscribeOutcome::AlreadySubscribed)
    }
}

pub async fn unsubscribe(
    storage: &dyn Storage,
    user_id: Uuid,
    category_id: Uuid,
) -> Result<UnsubscribeOutcome> {
    if storage.remove_subscriber(category_id, user_id).await? {
        info!(user = %user_id, category = %category_id, "Unsubscribed");
        Ok(UnsubscribeOutcome::Unsubscribed)
    } else {
        Ok(UnsubscribeOutcome::NotSubscribed)
    }
}
