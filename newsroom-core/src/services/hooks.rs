//! Explicit on-create hooks.
//!
//! Side effects of a write (role bootstrap, profile creation, mail
//! enqueueing, rating recomputation) are registered observers invoked by
//! the same code path that performs the write — `ContentService` — not an
//! implicit dispatch table keyed by entity type.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::common::error::Result;
use crate::domain::{Category, Comment, Post, Profile, User};
use crate::services::{ratings, roles::Role};
use crate::storage::Storage;
use crate::tasks::{TaskPayload, TaskQueue};

#[async_trait]
pub trait UserCreated: Send + Sync {
    async fn user_created(&self, user: &User) -> Result<()>;
}

#[async_trait]
pub trait CommentCreated: Send + Sync {
    async fn comment_created(&self, comment: &Comment) -> Result<()>;
}

#[async_trait]
pub trait PostCategorized: Send + Sync {
    async fn post_categorized(&self, post: &Post, category: &Category) -> Result<()>;
}

/// Hook registry. Hooks run in registration order; a persistence failure
/// propagates to the caller.
#[derive(Default, Clone)]
pub struct Hooks {
    user_created: Vec<Arc<dyn UserCreated>>,
    comment_created: Vec<Arc<dyn CommentCreated>>,
    post_categorized: Vec<Arc<dyn PostCategorized>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full production hook set: role bootstrap, profile bootstrap,
    /// welcome mail, author-rating recompute and subscriber fan-out.
    pub fn standard(storage: Arc<dyn Storage>, queue: TaskQueue) -> Self {
        Self::new()
            .on_user_created(Arc::new(RoleBootstrapHook {
                storage: storage.clone(),
            }))
            .on_user_created(Arc::new(ProfileBootstrapHook {
                storage: storage.clone(),
            }))
            .on_user_created(Arc::new(WelcomeMailHook {
                queue: queue.clone(),
            }))
            .on_comment_created(Arc::new(AuthorRatingHook { storage }))
            .on_post_categorized(Arc::new(SubscriberFanoutHook { queue }))
    }

    pub fn on_user_created(mut self, hook: Arc<dyn UserCreated>) -> Self {
        self.user_created.push(hook);
        self
    }

    pub fn on_comment_created(mut self, hook: Arc<dyn CommentCreated>) -> Self {
        self.comment_created.push(hook);
        self
    }

    pub fn on_post_categorized(mut self, hook: Arc<dyn PostCategorized>) -> Self {
        self.post_categorized.push(hook);
        self
    }

    pub(crate) async fn run_user_created(&self, user: &User) -> Result<()> {
        for hook in &self.user_created {
            hook.user_created(user).await?;
        }
        Ok(())
    }

    pub(crate) async fn run_comment_created(&self, comment: &Comment) -> Result<()> {
        for hook in &self.comment_created {
            hook.comment_created(comment).await?;
        }
        Ok(())
    }

    pub(crate) async fn run_post_categorized(&self, post: &Post, category: &Category) -> Result<()> {
        for hook in &self.post_categorized {
            hook.post_categorized(post, category).await?;
        }
        Ok(())
    }
}

/// Every new user lands in the common role.
pub struct RoleBootstrapHook {
    pub storage: Arc<dyn Storage>,
}

#[async_trait]
impl UserCreated for RoleBootstrapHook {
    async fn user_created(&self, user: &User) -> Result<()> {
        self.storage.grant_role(user.id, Role::Common).await?;
        Ok(())
    }
}

/// Every new user gets an empty profile row.
pub struct ProfileBootstrapHook {
    pub storage: Arc<dyn Storage>,
}

#[async_trait]
impl UserCreated for ProfileBootstrapHook {
    async fn user_created(&self, user: &User) -> Result<()> {
        self.storage.create_profile(&Profile::empty(user.id)).await
    }
}

/// Welcome mail is best effort: an enqueue failure is logged, never
/// surfaced to the registration request.
pub struct WelcomeMailHook {
    pub queue: TaskQueue,
}

#[async_trait]
impl UserCreated for WelcomeMailHook {
    async fn user_created(&self, user: &User) -> Result<()> {
        let payload = TaskPayload::SendWelcomeEmail {
            username: user.username.clone(),
            email: user.email.clone(),
        };
        if let Err(e) = self.queue.enqueue(&payload).await {
            warn!(user = %user.username, error = %e, "Failed to enqueue welcome email");
        }
        Ok(())
    }
}

/// A new comment recomputes the aggregate of the commented post's author.
/// Rating changes after creation do not re-trigger this (see DESIGN.md).
pub struct AuthorRatingHook {
    pub storage: Arc<dyn Storage>,
}

#[async_trait]
impl CommentCreated for AuthorRatingHook {
    async fn comment_created(&self, comment: &Comment) -> Result<()> {
        let Some(post) = self.storage.get_post(comment.post_id).await? else {
            return Ok(());
        };
        ratings::update_author_rating(self.storage.as_ref(), post.author_id).await?;
        Ok(())
    }
}

/// A newly attached category enqueues one fan-out task. Fires once per
/// category attached, so a post in two categories notifies twice.
pub struct SubscriberFanoutHook {
    pub queue: TaskQueue,
}

#[async_trait]
impl PostCategorized for SubscriberFanoutHook {
    async fn post_categorized(&self, post: &Post, category: &Category) -> Result<()> {
        let payload = TaskPayload::NotifyCategorySubscribers {
            post_id: post.id,
            category_id: category.id,
        };
        if let Err(e) = self.queue.enqueue(&payload).await {
            warn!(post = %post.title, category = %category.name, error = %e,
                "Failed to enqueue subscriber notification");
        }
        Ok(())
    }
}
