//! Profile view/edit and the author self-upgrade.

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::NaiveDate;

use newsroom_core::domain::Profile;
use newsroom_core::services::roles::{self, Role};
use newsroom_core::storage::Storage;
use newsroom_core::NewsroomError;

use crate::error::{render, WebResult};
use crate::models::{ProfileForm, UserView};
use crate::state::{AppState, CurrentUser};
use crate::templates::ProfileTemplate;

pub async fn profile_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Html<String>> {
    let profile = state
        .storage
        .get_profile(user.id)
        .await?
        .unwrap_or_else(|| Profile::empty(user.id));
    let is_author = roles::has_role(state.storage.as_ref(), user.id, Role::Author).await?;

    render(ProfileTemplate {
        username: user.username.clone(),
        bio: profile.bio,
        location: profile.location,
        birth_date: profile
            .birth_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        is_author,
        error: None,
        user: Some(UserView {
            username: user.username,
            is_author,
        }),
    })
}

pub async fn profile_update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    axum::extract::Form(form): axum::extract::Form<ProfileForm>,
) -> WebResult<Response> {
    let birth_date = match form.birth_date.trim() {
        "" => None,
        raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                let is_author =
                    roles::has_role(state.storage.as_ref(), user.id, Role::Author).await?;
                return Ok(render(ProfileTemplate {
                    username: user.username.clone(),
                    bio: form.bio,
                    location: form.location,
                    birth_date: form.birth_date,
                    is_author,
                    error: Some("Birth date must be YYYY-MM-DD".to_string()),
                    user: Some(UserView {
                        username: user.username,
                        is_author,
                    }),
                })?
                .into_response());
            }
        },
    };

    let profile = Profile {
        user_id: user.id,
        bio: form.bio.trim().to_string(),
        location: form.location.trim().to_string(),
        birth_date,
    };
    // Users predating the profile hook may have no row yet.
    match state.storage.update_profile(&profile).await {
        Err(NewsroomError::NotFound { .. }) => state.storage.create_profile(&profile).await?,
        other => other?,
    }

    Ok(Redirect::to("/profile").into_response())
}

pub async fn become_author(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Redirect> {
    roles::grant_author(state.storage.as_ref(), user.id).await?;
    Ok(Redirect::to("/profile"))
}
