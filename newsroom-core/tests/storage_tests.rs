mod common;

use chrono::{Duration, Utc};
use common::{make_author, make_category, make_user, test_storage};
use newsroom_core::domain::{Post, PostKind};
use newsroom_core::storage::{PostSearch, Storage};
use newsroom_core::tasks::{TaskPayload, TaskQueue};

#[tokio::test]
async fn post_listing_is_newest_first_and_paginated() {
    let (_dir, storage) = test_storage().await;
    let (_user, author) = make_author(storage.as_ref(), "alice").await;

    for i in 0..15i64 {
        let mut post = Post::new(author.id, PostKind::News, format!("Post {i}"), "content");
        // Spread creation times so ordering is deterministic.
        post.created_at = Utc::now() - Duration::minutes(15 - i);
        storage.create_post(&post).await.unwrap();
    }

    let first_page = storage.list_posts(10, 0).await.unwrap();
    assert_eq!(first_page.len(), 10);
    assert_eq!(first_page[0].title, "Post 14");

    let second_page = storage.list_posts(10, 10).await.unwrap();
    assert_eq!(second_page.len(), 5);
    assert_eq!(storage.count_posts().await.unwrap(), 15);
}

#[tokio::test]
async fn search_filters_compose() {
    let (_dir, storage) = test_storage().await;
    let (_alice, alice_author) = make_author(storage.as_ref(), "alice").await;
    let (_bob, bob_author) = make_author(storage.as_ref(), "bob").await;

    let mut old = Post::new(alice_author.id, PostKind::Article, "Rust ships", "content");
    old.created_at = Utc::now() - Duration::days(30);
    storage.create_post(&old).await.unwrap();
    storage
        .create_post(&Post::new(alice_author.id, PostKind::News, "Rust again", "content"))
        .await
        .unwrap();
    storage
        .create_post(&Post::new(bob_author.id, PostKind::News, "Go ships", "content"))
        .await
        .unwrap();

    let by_title = storage
        .search_posts(&PostSearch {
            title: Some("Rust".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_title.len(), 2);

    let by_author = storage
        .search_posts(&PostSearch {
            author_username: Some("bob".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].title, "Go ships");

    let recent_rust = storage
        .search_posts(&PostSearch {
            title: Some("Rust".to_string()),
            since: Some(Utc::now() - Duration::days(7)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(recent_rust.len(), 1);
    assert_eq!(recent_rust[0].title, "Rust again");

    // Unknown author yields an empty result, not an error.
    let unknown = storage
        .search_posts(&PostSearch {
            author_username: Some("nobody".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn category_posts_respect_the_since_boundary() {
    let (_dir, storage) = test_storage().await;
    let (_user, author) = make_author(storage.as_ref(), "alice").await;
    let category = make_category(storage.as_ref(), "Tech").await;

    let mut stale = Post::new(author.id, PostKind::News, "Old", "content");
    stale.created_at = Utc::now() - Duration::days(8);
    storage.create_post(&stale).await.unwrap();
    storage.attach_category(stale.id, category.id).await.unwrap();

    let fresh = Post::new(author.id, PostKind::News, "New", "content");
    storage.create_post(&fresh).await.unwrap();
    storage.attach_category(fresh.id, category.id).await.unwrap();

    let recent = storage
        .posts_in_category_since(category.id, Utc::now() - Duration::days(7))
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].title, "New");
}

#[tokio::test]
async fn users_without_profiles_are_backfill_targets() {
    let (_dir, storage) = test_storage().await;
    let bare = make_user(storage.as_ref(), "bare").await;
    let covered = make_user(storage.as_ref(), "covered").await;
    storage
        .create_profile(&newsroom_core::domain::Profile::empty(covered.id))
        .await
        .unwrap();

    let missing = storage.users_without_profiles().await.unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].id, bare.id);
}

#[tokio::test]
async fn claimed_tasks_leave_the_pending_set() {
    let (_dir, storage) = test_storage().await;
    let queue = TaskQueue::new(storage.clone());

    let id = queue
        .enqueue(&TaskPayload::SendWelcomeEmail {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        })
        .await
        .unwrap();

    let claimed = storage.claim_pending_tasks(10).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].id, id);
    assert_eq!(claimed[0].attempts, 1);

    assert!(storage.pending_tasks().await.unwrap().is_empty());
    assert!(storage.claim_pending_tasks(10).await.unwrap().is_empty());

    storage.mark_task_done(id).await.unwrap();
}
