//! Rating aggregation.
//!
//! Post and comment ratings move by exactly ±1 per like/dislike call. The
//! author aggregate is a pure recomputation from current child rows; stale
//! values are overwritten, never incrementally patched. The read-then-write
//! is not wrapped in a transaction, so concurrent updates race with
//! last-writer-wins semantics (kept as-is, see DESIGN.md).

use tracing::debug;
use uuid::Uuid;

use crate::common::error::Result;
use crate::storage::Storage;

/// Posts weigh three times as much as comments in the author aggregate.
pub const POST_RATING_WEIGHT: i64 = 3;

/// Recompute and persist an author's aggregate rating:
/// `3·Σ(post.rating) + Σ(own comment.rating) + Σ(comment.rating on the
/// author's posts)`. Returns the new value.
pub async fn update_author_rating(storage: &dyn Storage, author_id: Uuid) -> Result<i64> {
    let posts_rating = storage.sum_post_ratings(author_id).await?;
    let own_comments_rating = storage.sum_comment_ratings_by_author_user(author_id).await?;
    let comments_on_posts_rating = storage
        .sum_comment_ratings_on_author_posts(author_id)
        .await?;

    let rating =
        POST_RATING_WEIGHT * posts_rating + own_comments_rating + comments_on_posts_rating;
    storage.set_author_rating(author_id, rating).await?;

    debug!(author = %author_id, rating, "Recomputed author rating");
    Ok(rating)
}

/// ±1 increments with immediate persistence. None of these touch the
/// author aggregate; the only automatic recompute happens when a comment
/// is created (see `services::hooks`).
pub async fn like_post(storage: &dyn Storage, post_id: Uuid) -> Result<i64> {
    storage.adjust_post_rating(post_id, 1).await
}

pub async fn dislike_post(storage: &dyn Storage, post_id: Uuid) -> Result<i64> {
    storage.adjust_post_rating(post_id, -1).await
}

pub async fn like_comment(storage: &dyn Storage, comment_id: Uuid) -> Result<i64> {
    storage.adjust_comment_rating(comment_id, 1).await
}

pub async fn dislike_comment(storage: &dyn Storage, comment_id: Uuid) -> Result<i64> {
    storage.adjust_comment_rating(comment_id, -1).await
}
