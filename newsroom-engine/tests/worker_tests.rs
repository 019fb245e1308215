mod common;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use common::{make_author, make_category, make_user, test_settings, test_storage};
use newsroom_core::domain::PostKind;
use newsroom_core::services::{subscriptions, ContentService, Hooks};
use newsroom_core::storage::Storage;
use newsroom_core::tasks::{TaskPayload, TaskQueue, TaskRecord};
use newsroom_engine::mail::{Mailer, MemoryMailer};
use newsroom_engine::tasks::Worker;

fn worker_with_outbox(
    storage: &Arc<dyn newsroom_core::storage::Storage>,
) -> (Worker, MemoryMailer) {
    let mailer = MemoryMailer::new();
    let worker = Worker::new(
        storage.clone(),
        Arc::new(mailer.clone()) as Arc<dyn Mailer>,
        Arc::new(test_settings()),
    );
    (worker, mailer)
}

#[tokio::test]
async fn tagged_post_notifies_the_category_subscriber_exactly_once() {
    let (_dir, storage) = test_storage().await;
    let (_user, author) = make_author(storage.as_ref(), "alice").await;
    let sports = make_category(storage.as_ref(), "Sports").await;
    let subscriber = make_user(storage.as_ref(), "sam").await;
    subscriptions::subscribe(storage.as_ref(), subscriber.id, sports.id)
        .await
        .unwrap();

    let queue = TaskQueue::new(storage.clone());
    let content = ContentService::new(storage.clone(), Hooks::standard(storage.clone(), queue));
    content
        .create_post(
            author.id,
            PostKind::News,
            "Match report",
            "The match went into overtime.",
            &[sports.id],
        )
        .await
        .unwrap();

    // Exactly one notification task waits for the worker.
    assert_eq!(storage.pending_tasks().await.unwrap().len(), 1);

    let (worker, outbox) = worker_with_outbox(&storage);
    assert_eq!(worker.run_once().await.unwrap(), 1);

    let sent = outbox.outbox();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["sam@example.com".to_string()]);
    assert!(sent[0].subject.contains("Sports"));
    assert!(sent[0].body.contains("Match report"));
    assert!(sent[0].html_body.as_ref().unwrap().contains("Match report"));

    // Nothing left to claim.
    assert_eq!(worker.run_once().await.unwrap(), 0);
}

#[tokio::test]
async fn a_post_in_two_categories_notifies_a_subscriber_of_both_twice() {
    let (_dir, storage) = test_storage().await;
    let (_user, author) = make_author(storage.as_ref(), "alice").await;
    let sports = make_category(storage.as_ref(), "Sports").await;
    let science = make_category(storage.as_ref(), "Science").await;
    let subscriber = make_user(storage.as_ref(), "sam").await;
    for category in [&sports, &science] {
        subscriptions::subscribe(storage.as_ref(), subscriber.id, category.id)
            .await
            .unwrap();
    }

    let queue = TaskQueue::new(storage.clone());
    let content = ContentService::new(storage.clone(), Hooks::standard(storage.clone(), queue));
    content
        .create_post(
            author.id,
            PostKind::News,
            "Crossover",
            "content",
            &[sports.id, science.id],
        )
        .await
        .unwrap();

    let (worker, outbox) = worker_with_outbox(&storage);
    worker.run_once().await.unwrap();

    // No de-duplication across categories: two messages to the same reader.
    assert_eq!(outbox.sent_count(), 2);
}

#[tokio::test]
async fn welcome_email_reaches_the_new_user() {
    let (_dir, storage) = test_storage().await;
    let queue = TaskQueue::new(storage.clone());
    queue
        .enqueue(&TaskPayload::SendWelcomeEmail {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        })
        .await
        .unwrap();

    let (worker, outbox) = worker_with_outbox(&storage);
    worker.run_once().await.unwrap();

    let sent = outbox.outbox();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Welcome to Newsroom!");
    assert_eq!(sent[0].to, vec!["alice@example.com".to_string()]);
    assert!(sent[0].body.contains("alice"));
}

#[tokio::test]
async fn fanout_without_subscribers_sends_nothing() {
    let (_dir, storage) = test_storage().await;
    let (_user, author) = make_author(storage.as_ref(), "alice").await;
    let lonely = make_category(storage.as_ref(), "Lonely").await;

    let queue = TaskQueue::new(storage.clone());
    let content = ContentService::new(storage.clone(), Hooks::standard(storage.clone(), queue));
    content
        .create_post(author.id, PostKind::News, "Unseen", "content", &[lonely.id])
        .await
        .unwrap();

    let (worker, outbox) = worker_with_outbox(&storage);
    assert_eq!(worker.run_once().await.unwrap(), 1);
    assert_eq!(outbox.sent_count(), 0);
    assert!(storage.pending_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn an_undecodable_payload_is_settled_as_failed() {
    let (_dir, storage) = test_storage().await;
    storage
        .enqueue_task(&TaskRecord {
            id: Uuid::new_v4(),
            name: "mystery".to_string(),
            args: "{not json".to_string(),
            attempts: 0,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let (worker, outbox) = worker_with_outbox(&storage);
    assert_eq!(worker.run_once().await.unwrap(), 1);
    assert_eq!(outbox.sent_count(), 0);
    // The row left the pending set and stayed gone.
    assert!(storage.pending_tasks().await.unwrap().is_empty());
    assert_eq!(worker.run_once().await.unwrap(), 0);
}

#[tokio::test]
async fn fanout_for_a_vanished_post_is_swallowed() {
    let (_dir, storage) = test_storage().await;
    let sports = make_category(storage.as_ref(), "Sports").await;

    let queue = TaskQueue::new(storage.clone());
    queue
        .enqueue(&TaskPayload::NotifyCategorySubscribers {
            post_id: Uuid::new_v4(),
            category_id: sports.id,
        })
        .await
        .unwrap();

    let (worker, outbox) = worker_with_outbox(&storage);
    assert_eq!(worker.run_once().await.unwrap(), 1);
    assert_eq!(outbox.sent_count(), 0);
}
