//! Form payloads and the view models the templates render.

use serde::Deserialize;

use newsroom_core::domain::{Comment, Post, User};

#[derive(Debug, Clone)]
pub struct UserView {
    pub username: String,
    pub is_author: bool,
}

#[derive(Debug, Clone)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub kind: &'static str,
    pub author: String,
    pub rating: i64,
    pub created_at: String,
    pub preview: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PostDetailView {
    pub id: String,
    pub title: String,
    pub kind: &'static str,
    pub author: String,
    pub rating: i64,
    pub created_at: String,
    pub content: String,
    pub categories: Vec<String>,
    pub can_edit: bool,
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub id: String,
    pub username: String,
    pub body: String,
    pub rating: i64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub subscribed: bool,
}

pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

pub fn post_view(post: &Post, author_username: &str, categories: Vec<String>) -> PostView {
    PostView {
        id: post.id.to_string(),
        title: post.title.clone(),
        kind: post.kind.label(),
        author: author_username.to_string(),
        rating: post.rating,
        created_at: format_timestamp(&post.created_at),
        preview: post.preview(),
        categories,
    }
}

pub fn comment_view(comment: &Comment, user: Option<&User>) -> CommentView {
    CommentView {
        id: comment.id.to_string(),
        username: user.map(|u| u.username.clone()).unwrap_or_else(|| "unknown".to_string()),
        body: comment.body.clone(),
        rating: comment.rating,
        created_at: format_timestamp(&comment.created_at),
    }
}

// Form payloads

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub kind: String,
    pub title: String,
    pub content: String,
    /// Comma-separated category names.
    #[serde(default)]
    pub categories: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub author: Option<String>,
    /// Lower bound on creation date, `YYYY-MM-DD`.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    /// `YYYY-MM-DD`, empty to clear.
    #[serde(default)]
    pub birth_date: String,
}
