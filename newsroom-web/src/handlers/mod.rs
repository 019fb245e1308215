pub mod auth;
pub mod categories;
pub mod posts;
pub mod profiles;

use newsroom_core::domain::{Post, User};
use newsroom_core::services::roles::{self, Role};
use newsroom_core::storage::Storage;

use crate::error::WebResult;
use crate::models::{self, PostView, UserView};
use crate::state::AppState;

/// Navigation view of the logged-in user, if any.
pub(crate) async fn user_view(state: &AppState, user: &Option<User>) -> WebResult<Option<UserView>> {
    match user {
        Some(user) => Ok(Some(nav_user(state, user).await?)),
        None => Ok(None),
    }
}

pub(crate) async fn nav_user(state: &AppState, user: &User) -> WebResult<UserView> {
    let is_author = roles::has_role(state.storage.as_ref(), user.id, Role::Author).await?;
    Ok(UserView {
        username: user.username.clone(),
        is_author,
    })
}

/// Resolve the author username and category names a list view needs.
pub(crate) async fn post_to_view(state: &AppState, post: &Post) -> WebResult<PostView> {
    let username = author_username(state, post).await?;
    let categories = state
        .storage
        .categories_of_post(post.id)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    Ok(models::post_view(post, &username, categories))
}

pub(crate) async fn author_username(state: &AppState, post: &Post) -> WebResult<String> {
    let Some(author) = state.storage.get_author_by_id(post.author_id).await? else {
        return Ok("unknown".to_string());
    };
    Ok(state
        .storage
        .get_user_by_id(author.user_id)
        .await?
        .map(|u| u.username)
        .unwrap_or_else(|| "unknown".to_string()))
}
