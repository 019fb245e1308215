mod common;

use common::{make_author, test_storage};
use newsroom_core::domain::{Comment, Post, PostKind};
use newsroom_core::services::ratings;
use newsroom_core::storage::Storage;

#[tokio::test]
async fn author_rating_follows_the_weighted_formula() {
    let (_dir, storage) = test_storage().await;
    let (user, author) = make_author(storage.as_ref(), "alice").await;
    let (other_user, other_author) = make_author(storage.as_ref(), "bob").await;

    // Two posts by alice, one by bob.
    let post1 = Post::new(author.id, PostKind::Article, "First", "content");
    let post2 = Post::new(author.id, PostKind::News, "Second", "content");
    let bob_post = Post::new(other_author.id, PostKind::Article, "Bob's", "content");
    for post in [&post1, &post2, &bob_post] {
        storage.create_post(post).await.unwrap();
    }

    // post1 at +2, post2 at -1.
    ratings::like_post(storage.as_ref(), post1.id).await.unwrap();
    ratings::like_post(storage.as_ref(), post1.id).await.unwrap();
    ratings::dislike_post(storage.as_ref(), post2.id).await.unwrap();

    // A comment by alice on bob's post at +3.
    let own_comment = Comment::new(bob_post.id, user.id, "nice");
    storage.create_comment(&own_comment).await.unwrap();
    for _ in 0..3 {
        ratings::like_comment(storage.as_ref(), own_comment.id)
            .await
            .unwrap();
    }

    // A comment by bob on alice's post at +1.
    let incoming = Comment::new(post1.id, other_user.id, "thanks");
    storage.create_comment(&incoming).await.unwrap();
    ratings::like_comment(storage.as_ref(), incoming.id)
        .await
        .unwrap();

    // 3 * (2 - 1) + 3 + 1 = 7
    let rating = ratings::update_author_rating(storage.as_ref(), author.id)
        .await
        .unwrap();
    assert_eq!(rating, 7);

    let stored = storage.get_author_by_id(author.id).await.unwrap().unwrap();
    assert_eq!(stored.rating, 7);
}

#[tokio::test]
async fn recompute_overwrites_a_stale_aggregate() {
    let (_dir, storage) = test_storage().await;
    let (_user, author) = make_author(storage.as_ref(), "alice").await;

    storage.set_author_rating(author.id, 999).await.unwrap();

    let rating = ratings::update_author_rating(storage.as_ref(), author.id)
        .await
        .unwrap();
    assert_eq!(rating, 0);
}

#[tokio::test]
async fn like_then_dislike_is_a_net_zero() {
    let (_dir, storage) = test_storage().await;
    let (_user, author) = make_author(storage.as_ref(), "alice").await;

    let post = Post::new(author.id, PostKind::News, "Breaking", "content");
    storage.create_post(&post).await.unwrap();

    let before = storage.get_post(post.id).await.unwrap().unwrap().rating;
    ratings::like_post(storage.as_ref(), post.id).await.unwrap();
    let after = ratings::dislike_post(storage.as_ref(), post.id)
        .await
        .unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn each_call_moves_the_rating_by_exactly_one() {
    let (_dir, storage) = test_storage().await;
    let (user, author) = make_author(storage.as_ref(), "alice").await;

    let post = Post::new(author.id, PostKind::Article, "Opinion", "content");
    storage.create_post(&post).await.unwrap();
    let comment = Comment::new(post.id, user.id, "first");
    storage.create_comment(&comment).await.unwrap();

    assert_eq!(
        ratings::like_comment(storage.as_ref(), comment.id)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        ratings::like_comment(storage.as_ref(), comment.id)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        ratings::dislike_comment(storage.as_ref(), comment.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn liking_an_unknown_post_is_a_not_found_error() {
    let (_dir, storage) = test_storage().await;
    let result = ratings::like_post(storage.as_ref(), uuid::Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(newsroom_core::NewsroomError::NotFound { .. })
    ));
}
