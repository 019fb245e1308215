mod common;

use std::sync::Arc;

use common::{make_author, make_category, make_user, test_storage};
use newsroom_core::domain::PostKind;
use newsroom_core::services::roles::Role;
use newsroom_core::services::subscriptions;
use newsroom_core::services::{ContentService, Hooks};
use newsroom_core::storage::Storage;
use newsroom_core::tasks::{TaskPayload, TaskQueue};
use newsroom_core::NewsroomError;

fn service(storage: &Arc<dyn newsroom_core::storage::Storage>) -> ContentService {
    let queue = TaskQueue::new(storage.clone());
    let hooks = Hooks::standard(storage.clone(), queue);
    ContentService::new(storage.clone(), hooks)
}

#[tokio::test]
async fn registration_bootstraps_role_profile_and_welcome_mail() {
    let (_dir, storage) = test_storage().await;
    let content = service(&storage);

    let user = content
        .register_user("alice", "alice@example.com", "hash")
        .await
        .unwrap();

    let roles = storage.roles_of_user(user.id).await.unwrap();
    assert_eq!(roles, vec![Role::Common]);

    let profile = storage.get_profile(user.id).await.unwrap().unwrap();
    assert!(profile.bio.is_empty());

    let pending = storage.pending_tasks().await.unwrap();
    assert_eq!(pending.len(), 1);
    match pending[0].payload().unwrap() {
        TaskPayload::SendWelcomeEmail { username, email } => {
            assert_eq!(username, "alice");
            assert_eq!(email, "alice@example.com");
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let (_dir, storage) = test_storage().await;
    let content = service(&storage);

    content
        .register_user("alice", "alice@example.com", "hash")
        .await
        .unwrap();
    let result = content
        .register_user("alice", "other@example.com", "hash")
        .await;
    assert!(matches!(result, Err(NewsroomError::Conflict(_))));
}

#[tokio::test]
async fn a_new_comment_recomputes_the_author_aggregate() {
    let (_dir, storage) = test_storage().await;
    let content = service(&storage);
    let (_user, author) = make_author(storage.as_ref(), "alice").await;
    let commenter = make_user(storage.as_ref(), "bob").await;

    let post = content
        .create_post(author.id, PostKind::Article, "Title", "content", &[])
        .await
        .unwrap();
    newsroom_core::services::ratings::like_post(storage.as_ref(), post.id)
        .await
        .unwrap();

    // The aggregate is stale until a comment lands.
    assert_eq!(
        storage.get_author_by_id(author.id).await.unwrap().unwrap().rating,
        0
    );

    content
        .create_comment(post.id, commenter.id, "nice read")
        .await
        .unwrap();

    // 3 * 1 post rating, comment itself still at zero.
    assert_eq!(
        storage.get_author_by_id(author.id).await.unwrap().unwrap().rating,
        3
    );
}

#[tokio::test]
async fn tagging_a_post_enqueues_one_notification_per_category() {
    let (_dir, storage) = test_storage().await;
    let content = service(&storage);
    let (_user, author) = make_author(storage.as_ref(), "alice").await;
    let sports = make_category(storage.as_ref(), "Sports").await;
    let science = make_category(storage.as_ref(), "Science").await;

    let subscriber = make_user(storage.as_ref(), "sam").await;
    subscriptions::subscribe(storage.as_ref(), subscriber.id, sports.id)
        .await
        .unwrap();

    let post = content
        .create_post(
            author.id,
            PostKind::News,
            "Match report",
            "content",
            &[sports.id, science.id],
        )
        .await
        .unwrap();

    let pending = storage.pending_tasks().await.unwrap();
    let notifications: Vec<_> = pending
        .iter()
        .filter_map(|t| match t.payload().unwrap() {
            TaskPayload::NotifyCategorySubscribers {
                post_id,
                category_id,
            } => Some((post_id, category_id)),
            _ => None,
        })
        .collect();

    // One task per attached category, not per subscriber.
    assert_eq!(notifications.len(), 2);
    assert!(notifications.contains(&(post.id, sports.id)));
    assert!(notifications.contains(&(post.id, science.id)));
}

#[tokio::test]
async fn reattaching_a_category_does_not_enqueue_again() {
    let (_dir, storage) = test_storage().await;
    let content = service(&storage);
    let (_user, author) = make_author(storage.as_ref(), "alice").await;
    let sports = make_category(storage.as_ref(), "Sports").await;

    let post = content
        .create_post(author.id, PostKind::News, "Title", "content", &[sports.id])
        .await
        .unwrap();

    assert!(!content.attach_category(&post, sports.id).await.unwrap());
    assert_eq!(storage.pending_tasks().await.unwrap().len(), 1);
}
