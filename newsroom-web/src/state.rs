use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use newsroom_core::cache::PostCache;
use newsroom_core::domain::User;
use newsroom_core::services::ContentService;
use newsroom_core::storage::Storage;
use newsroom_core::Settings;

use crate::error::AuthRedirect;
use crate::session::{cookie_value, SessionStore, SESSION_COOKIE};

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub content: Arc<ContentService>,
    pub sessions: Arc<SessionStore>,
    pub post_cache: Arc<PostCache>,
    pub settings: Arc<Settings>,
}

async fn session_user(parts: &Parts, state: &AppState) -> Option<User> {
    let header = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    let token = cookie_value(header, SESSION_COOKIE)?;
    let user_id = state.sessions.user_id(token)?;
    state.storage.get_user_by_id(user_id).await.ok().flatten()
}

/// The logged-in user, if any. Never rejects.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_user(parts, state).await))
    }
}

/// The logged-in user; anonymous requests are redirected to the login page.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_user(parts, state).await.map(CurrentUser).ok_or(AuthRedirect)
    }
}
