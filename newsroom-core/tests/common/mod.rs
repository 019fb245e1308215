#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use newsroom_core::domain::{Author, Category, User};
use newsroom_core::storage::{DatabaseStorage, Storage};
use newsroom_core::DatabaseManager;

/// Fresh migrated database in a temporary directory. Keep the TempDir
/// alive for the duration of the test.
pub async fn test_storage() -> (TempDir, Arc<dyn Storage>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("newsroom-test.db");
    let db = DatabaseManager::new_local(path.to_str().expect("utf-8 path"))
        .await
        .expect("open database");
    db.run_migrations().await.expect("migrations");
    let storage: Arc<dyn Storage> = Arc::new(DatabaseStorage::new(Arc::new(db)));
    (dir, storage)
}

pub async fn make_user(storage: &dyn Storage, username: &str) -> User {
    let user = User::new(username, format!("{username}@example.com"), "hash");
    storage.create_user(&user).await.expect("create user");
    user
}

pub async fn make_author(storage: &dyn Storage, username: &str) -> (User, Author) {
    let user = make_user(storage, username).await;
    let author = Author::new(user.id);
    storage.create_author(&author).await.expect("create author");
    (user, author)
}

pub async fn make_category(storage: &dyn Storage, name: &str) -> Category {
    let category = Category::new(name);
    storage.create_category(&category).await.expect("create category");
    category
}
