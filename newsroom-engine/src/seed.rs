//! Demo dataset: a small walkthrough of the content model that ends by
//! reporting the best author and the best post.

use std::sync::Arc;

use tracing::info;

use newsroom_core::domain::PostKind;
use newsroom_core::services::{ratings, roles, ContentService, Hooks};
use newsroom_core::storage::Storage;
use newsroom_core::tasks::TaskQueue;
use newsroom_core::Result;

pub async fn run(storage: Arc<dyn Storage>) -> Result<()> {
    let queue = TaskQueue::new(storage.clone());
    let hooks = Hooks::standard(storage.clone(), queue);
    let content = ContentService::new(storage.clone(), hooks);

    // Two users, both upgraded to authors. The "!" hash marks an unusable
    // password; seeded accounts cannot log in.
    let user1 = content.register_user("user1", "user1@example.com", "!").await?;
    let user2 = content.register_user("user2", "user2@example.com", "!").await?;
    let author1 = roles::grant_author(storage.as_ref(), user1.id).await?;
    let author2 = roles::grant_author(storage.as_ref(), user2.id).await?;

    // Four categories.
    let sports = content.create_category("Sports").await?;
    let politics = content.create_category("Politics").await?;
    let science = content.create_category("Science").await?;
    let technology = content.create_category("Technology").await?;

    // Two articles and one news item, each tagged with two categories.
    let post1 = content
        .create_post(
            author1.id,
            PostKind::Article,
            "Article one",
            "Body of the first article.",
            &[sports.id, politics.id],
        )
        .await?;
    let post2 = content
        .create_post(
            author2.id,
            PostKind::Article,
            "Article two",
            "Body of the second article.",
            &[science.id, technology.id],
        )
        .await?;
    let post3 = content
        .create_post(
            author1.id,
            PostKind::News,
            "News one",
            "Body of the first news item.",
            &[sports.id, science.id],
        )
        .await?;

    // Four comments across the posts.
    let comment1 = content
        .create_comment(post1.id, user1.id, "Comment on article one")
        .await?;
    let comment2 = content
        .create_comment(post2.id, user2.id, "Comment on article two")
        .await?;
    content
        .create_comment(post1.id, user2.id, "Second comment on article one")
        .await?;
    content
        .create_comment(post3.id, user1.id, "Comment on the news item")
        .await?;

    // A few rating adjustments.
    ratings::like_post(storage.as_ref(), post1.id).await?;
    ratings::dislike_post(storage.as_ref(), post2.id).await?;
    ratings::like_comment(storage.as_ref(), comment1.id).await?;
    ratings::dislike_comment(storage.as_ref(), comment2.id).await?;

    // Refresh both aggregates after the adjustments.
    ratings::update_author_rating(storage.as_ref(), author1.id).await?;
    ratings::update_author_rating(storage.as_ref(), author2.id).await?;

    info!("Seed data loaded");

    if let Some(best_author) = storage.top_author().await? {
        if let Some(user) = storage.get_user_by_id(best_author.user_id).await? {
            println!("Best author: {} (rating {})", user.username, best_author.rating);
        }
    }
    if let Some(best_post) = storage.top_post().await? {
        println!(
            "Best post: \"{}\" (rating {}, created {})",
            best_post.title, best_post.rating, best_post.created_at
        );
        println!("Preview: {}", best_post.preview());
        for comment in storage.comments_for_post(best_post.id).await? {
            println!(
                "  comment [{}] {}: {}",
                comment.rating, comment.created_at, comment.body
            );
        }
    }

    Ok(())
}
