//! Write paths that carry on-create side effects.
//!
//! Anything that must happen when a user, comment or post-category row is
//! created goes through here, so the hooks run exactly where the write
//! happens.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::common::error::{NewsroomError, Result};
use crate::domain::{Category, Comment, Post, PostKind, User};
use crate::services::hooks::Hooks;
use crate::storage::Storage;

pub struct ContentService {
    storage: Arc<dyn Storage>,
    hooks: Hooks,
}

impl ContentService {
    pub fn new(storage: Arc<dyn Storage>, hooks: Hooks) -> Self {
        Self { storage, hooks }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Register a user. Username and email collisions surface as conflicts;
    /// the hook chain grants the common role, creates the profile and
    /// enqueues the welcome mail.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() {
            return Err(NewsroomError::Validation("username must not be empty".into()));
        }
        if !email.contains('@') {
            return Err(NewsroomError::Validation(format!(
                "'{email}' is not a valid email address"
            )));
        }

        let user = User::new(username, email, password_hash);
        self.storage.create_user(&user).await?;
        self.hooks.run_user_created(&user).await?;

        info!(user = %user.username, "Registered user");
        Ok(user)
    }

    /// Create a post and attach its categories. Every newly created
    /// post-category row triggers the fan-out hook; re-attaching an
    /// existing category does not.
    pub async fn create_post(
        &self,
        author_id: Uuid,
        kind: PostKind,
        title: &str,
        content: &str,
        category_ids: &[Uuid],
    ) -> Result<Post> {
        if title.trim().is_empty() {
            return Err(NewsroomError::Validation("title must not be empty".into()));
        }

        let post = Post::new(author_id, kind, title.trim(), content);
        self.storage.create_post(&post).await?;

        for category_id in category_ids {
            self.attach_category(&post, *category_id).await?;
        }

        info!(post = %post.title, kind = post.kind.as_str(), "Created post");
        Ok(post)
    }

    /// Attach one category to an existing post, running the fan-out hook
    /// when the join row is new.
    pub async fn attach_category(&self, post: &Post, category_id: Uuid) -> Result<bool> {
        let category = self
            .storage
            .get_category_by_id(category_id)
            .await?
            .ok_or_else(|| NewsroomError::not_found("category", category_id))?;

        let created = self.storage.attach_category(post.id, category.id).await?;
        if created {
            self.hooks.run_post_categorized(post, &category).await?;
        }
        Ok(created)
    }

    /// Create a comment; the hook chain recomputes the post author's
    /// aggregate rating.
    pub async fn create_comment(&self, post_id: Uuid, user_id: Uuid, body: &str) -> Result<Comment> {
        if body.trim().is_empty() {
            return Err(NewsroomError::Validation("comment must not be empty".into()));
        }
        // The post must exist before we hang a comment off it.
        self.storage
            .get_post(post_id)
            .await?
            .ok_or_else(|| NewsroomError::not_found("post", post_id))?;

        let comment = Comment::new(post_id, user_id, body.trim());
        self.storage.create_comment(&comment).await?;
        self.hooks.run_comment_created(&comment).await?;
        Ok(comment)
    }

    /// Create a category with a unique name.
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NewsroomError::Validation("category name must not be empty".into()));
        }
        let category = Category::new(name);
        self.storage.create_category(&category).await?;
        Ok(category)
    }
}
