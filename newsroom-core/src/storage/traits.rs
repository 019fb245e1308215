use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::common::error::Result;
use crate::domain::*;
use crate::services::roles::Role;
use crate::tasks::TaskRecord;

/// Search filter for the post search endpoint. Empty fields are ignored;
/// an author username that matches no user yields an empty result set.
#[derive(Debug, Clone, Default)]
pub struct PostSearch {
    pub title: Option<String>,
    pub author_username: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

/// Storage trait for persisting the content model (users, authors,
/// categories, posts, comments, subscriptions, roles) and the task queue.
#[async_trait]
pub trait Storage: Send + Sync {
    // User operations
    async fn create_user(&self, user: &User) -> Result<()>;
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Users that never got a profile row (backfill target).
    async fn users_without_profiles(&self) -> Result<Vec<User>>;

    // Profile operations
    async fn create_profile(&self, profile: &Profile) -> Result<()>;
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;
    async fn update_profile(&self, profile: &Profile) -> Result<()>;

    // Author operations
    async fn create_author(&self, author: &Author) -> Result<()>;
    async fn get_author_by_id(&self, author_id: Uuid) -> Result<Option<Author>>;
    async fn get_author_by_user(&self, user_id: Uuid) -> Result<Option<Author>>;
    async fn list_authors(&self) -> Result<Vec<Author>>;
    async fn set_author_rating(&self, author_id: Uuid, rating: i64) -> Result<()>;
    /// Σ post.rating over the author's posts.
    async fn sum_post_ratings(&self, author_id: Uuid) -> Result<i64>;
    /// Σ comment.rating over comments written by the author's user.
    async fn sum_comment_ratings_by_author_user(&self, author_id: Uuid) -> Result<i64>;
    /// Σ comment.rating over comments left on the author's posts.
    async fn sum_comment_ratings_on_author_posts(&self, author_id: Uuid) -> Result<i64>;
    async fn top_author(&self) -> Result<Option<Author>>;

    // Category operations
    async fn create_category(&self, category: &Category) -> Result<()>;
    async fn get_category_by_id(&self, category_id: Uuid) -> Result<Option<Category>>;
    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;

    // Post operations
    async fn create_post(&self, post: &Post) -> Result<()>;
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>>;
    async fn update_post(&self, post: &Post) -> Result<()>;
    async fn delete_post(&self, post_id: Uuid) -> Result<()>;
    /// Newest first, with limit/offset pagination.
    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>>;
    async fn count_posts(&self) -> Result<i64>;
    async fn search_posts(&self, search: &PostSearch) -> Result<Vec<Post>>;
    async fn posts_in_category_since(
        &self,
        category_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Post>>;
    /// Apply a ±1 rating adjustment and return the resulting rating.
    async fn adjust_post_rating(&self, post_id: Uuid, delta: i64) -> Result<i64>;
    async fn top_post(&self) -> Result<Option<Post>>;

    // Post-category association
    /// Attach a category to a post. Returns true when the join row was
    /// newly created (the notification trigger), false when it existed.
    async fn attach_category(&self, post_id: Uuid, category_id: Uuid) -> Result<bool>;
    async fn categories_of_post(&self, post_id: Uuid) -> Result<Vec<Category>>;

    // Comment operations
    async fn create_comment(&self, comment: &Comment) -> Result<()>;
    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;
    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>>;
    async fn adjust_comment_rating(&self, comment_id: Uuid, delta: i64) -> Result<i64>;

    // Subscription operations (idempotent set semantics)
    /// Returns true when membership was added, false when it already existed.
    async fn add_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<bool>;
    /// Returns true when membership was removed, false when there was none.
    async fn remove_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn category_subscribers(&self, category_id: Uuid) -> Result<Vec<User>>;
    async fn is_subscribed(&self, category_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn subscribed_category_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    // Role operations (idempotent grant)
    /// Returns true when the role was newly granted.
    async fn grant_role(&self, user_id: Uuid, role: Role) -> Result<bool>;
    async fn revoke_role(&self, user_id: Uuid, role: Role) -> Result<bool>;
    async fn roles_of_user(&self, user_id: Uuid) -> Result<Vec<Role>>;

    // Task queue operations
    async fn enqueue_task(&self, task: &TaskRecord) -> Result<()>;
    /// Oldest-first batch of pending tasks, each moved to `running` with
    /// its attempt counter bumped.
    async fn claim_pending_tasks(&self, limit: i64) -> Result<Vec<TaskRecord>>;
    async fn mark_task_done(&self, task_id: Uuid) -> Result<()>;
    async fn mark_task_failed(&self, task_id: Uuid) -> Result<()>;
    async fn pending_tasks(&self) -> Result<Vec<TaskRecord>>;
}
