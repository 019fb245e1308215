use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::NewsroomError;

/// Longest content prefix shown in list views before the ellipsis marker.
pub const PREVIEW_LEN: usize = 124;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub bio: String,
    pub location: String,
    pub birth_date: Option<NaiveDate>,
}

impl Profile {
    /// The empty profile auto-created when a user registers.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            bio: String::new(),
            location: String::new(),
            birth_date: None,
        }
    }
}

/// A user with publishing rights and an aggregate content-quality score.
///
/// The rating is recomputed from current child rows, never incrementally
/// patched; see `services::ratings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: i64,
}

impl Author {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            rating: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    Article,
    News,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Article => "article",
            PostKind::News => "news",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostKind::Article => "Article",
            PostKind::News => "News",
        }
    }
}

impl std::str::FromStr for PostKind {
    type Err = NewsroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(PostKind::Article),
            "news" => Ok(PostKind::News),
            other => Err(NewsroomError::Validation(format!(
                "unknown post kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub kind: PostKind,
    pub title: String,
    pub content: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        author_id: Uuid,
        kind: PostKind,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            kind,
            title: title.into(),
            content: content.into(),
            rating: 0,
            created_at: Utc::now(),
        }
    }

    /// Truncated list-view preview: the first `PREVIEW_LEN` characters plus
    /// an ellipsis marker, or the content unchanged when it already fits.
    pub fn preview(&self) -> String {
        let mut chars = self.content.char_indices();
        match chars.nth(PREVIEW_LEN) {
            Some((byte_idx, _)) => format!("{}...", &self.content[..byte_idx]),
            None => self.content.clone(),
        }
    }
}

/// Join row between a post and a category. Its creation is the trigger
/// point for subscriber notification fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCategory {
    pub post_id: Uuid,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, user_id: Uuid, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            body: body.into(),
            rating: 0,
            created_at: Utc::now(),
        }
    }
}
