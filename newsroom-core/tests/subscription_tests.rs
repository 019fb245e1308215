mod common;

use common::{make_category, make_user, test_storage};
use newsroom_core::services::roles::{self, Permission, Role};
use newsroom_core::storage::Storage;
use newsroom_core::services::subscriptions::{
    self, SubscribeOutcome, UnsubscribeOutcome,
};

#[tokio::test]
async fn subscribing_twice_leaves_one_membership_row() {
    let (_dir, storage) = test_storage().await;
    let user = make_user(storage.as_ref(), "alice").await;
    let category = make_category(storage.as_ref(), "Sports").await;

    let first = subscriptions::subscribe(storage.as_ref(), user.id, category.id)
        .await
        .unwrap();
    assert_eq!(first, SubscribeOutcome::Subscribed);

    let second = subscriptions::subscribe(storage.as_ref(), user.id, category.id)
        .await
        .unwrap();
    assert_eq!(second, SubscribeOutcome::AlreadySubscribed);

    let subscribers = storage.category_subscribers(category.id).await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].id, user.id);
}

#[tokio::test]
async fn unsubscribing_a_non_subscriber_is_informational() {
    let (_dir, storage) = test_storage().await;
    let user = make_user(storage.as_ref(), "alice").await;
    let bystander = make_user(storage.as_ref(), "bob").await;
    let category = make_category(storage.as_ref(), "Science").await;

    subscriptions::subscribe(storage.as_ref(), user.id, category.id)
        .await
        .unwrap();

    let outcome = subscriptions::unsubscribe(storage.as_ref(), bystander.id, category.id)
        .await
        .unwrap();
    assert_eq!(outcome, UnsubscribeOutcome::NotSubscribed);

    // Membership unchanged.
    let subscribers = storage.category_subscribers(category.id).await.unwrap();
    assert_eq!(subscribers.len(), 1);

    let outcome = subscriptions::unsubscribe(storage.as_ref(), user.id, category.id)
        .await
        .unwrap();
    assert_eq!(outcome, UnsubscribeOutcome::Unsubscribed);
    assert!(storage
        .category_subscribers(category.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn granting_author_twice_is_idempotent() {
    let (_dir, storage) = test_storage().await;
    let user = make_user(storage.as_ref(), "alice").await;

    let author = roles::grant_author(storage.as_ref(), user.id).await.unwrap();
    let again = roles::grant_author(storage.as_ref(), user.id).await.unwrap();
    assert_eq!(author.id, again.id);

    // Exactly one role membership, and the derived permission set holds.
    let user_roles = storage.roles_of_user(user.id).await.unwrap();
    assert_eq!(
        user_roles.iter().filter(|r| **r == Role::Author).count(),
        1
    );
    assert!(roles::has_permission(storage.as_ref(), user.id, Permission::AddPost)
        .await
        .unwrap());
    assert!(roles::has_permission(storage.as_ref(), user.id, Permission::ChangePost)
        .await
        .unwrap());
}

#[tokio::test]
async fn revoking_author_removes_the_permissions() {
    let (_dir, storage) = test_storage().await;
    let user = make_user(storage.as_ref(), "alice").await;

    roles::grant_author(storage.as_ref(), user.id).await.unwrap();
    assert!(roles::revoke_author(storage.as_ref(), user.id).await.unwrap());
    assert!(!roles::revoke_author(storage.as_ref(), user.id).await.unwrap());

    assert!(!roles::has_permission(storage.as_ref(), user.id, Permission::AddPost)
        .await
        .unwrap());
    assert!(!roles::has_role(storage.as_ref(), user.id, Role::Author)
        .await
        .unwrap());
}
