//! One-shot maintenance commands.

use tracing::info;

use newsroom_core::domain::Profile;
use newsroom_core::services::ratings;
use newsroom_core::storage::Storage;
use newsroom_core::Result;

/// Create an empty profile for every user that lacks one. Returns how many
/// profiles were created.
pub async fn backfill_profiles(storage: &dyn Storage) -> Result<usize> {
    let users = storage.users_without_profiles().await?;
    for user in &users {
        storage.create_profile(&Profile::empty(user.id)).await?;
        info!(user = %user.username, "Profile created");
    }
    Ok(users.len())
}

/// Recompute the aggregate rating of every author. Returns how many
/// authors were updated.
pub async fn refresh_ratings(storage: &dyn Storage) -> Result<usize> {
    let authors = storage.list_authors().await?;
    for author in &authors {
        let rating = ratings::update_author_rating(storage, author.id).await?;
        info!(author = %author.id, rating, "Author rating refreshed");
    }
    Ok(authors.len())
}
