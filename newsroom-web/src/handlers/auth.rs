//! Registration, login and logout.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Redirect, Response};

use newsroom_core::storage::Storage;
use newsroom_core::NewsroomError;

use crate::error::{render, WebResult};
use crate::models::{LoginForm, SignupForm};
use crate::session::{cookie_value, hash_password, verify_password, SESSION_COOKIE};
use crate::state::{AppState, MaybeUser};
use crate::templates::{LoginTemplate, SignupTemplate};

use super::user_view;

/// Root redirect: authenticated visitors land on the news list, anonymous
/// ones on the login page.
pub async fn root(MaybeUser(user): MaybeUser) -> Redirect {
    if user.is_some() {
        Redirect::to("/news")
    } else {
        Redirect::to("/login")
    }
}

fn session_redirect(state: &AppState, location: &str, user_id: uuid::Uuid) -> Response {
    let token = state.sessions.create(user_id);
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    ([(header::SET_COOKIE, cookie)], Redirect::to(location)).into_response()
}

pub async fn login_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> WebResult<Html<String>> {
    render(LoginTemplate {
        error: None,
        user: user_view(&state, &user).await?,
    })
}

pub async fn login(
    State(state): State<AppState>,
    axum::extract::Form(form): axum::extract::Form<LoginForm>,
) -> WebResult<Response> {
    let user = state.storage.get_user_by_username(form.username.trim()).await?;
    match user {
        Some(user) if verify_password(&form.password, &user.password_hash) => {
            Ok(session_redirect(&state, "/news", user.id))
        }
        _ => Ok(render(LoginTemplate {
            error: Some("Invalid username or password".to_string()),
            user: None,
        })?
        .into_response()),
    }
}

pub async fn signup_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> WebResult<Html<String>> {
    render(SignupTemplate {
        error: None,
        username: String::new(),
        email: String::new(),
        user: user_view(&state, &user).await?,
    })
}

pub async fn signup(
    State(state): State<AppState>,
    axum::extract::Form(form): axum::extract::Form<SignupForm>,
) -> WebResult<Response> {
    let again = |error: String, form: &SignupForm| {
        render(SignupTemplate {
            error: Some(error),
            username: form.username.clone(),
            email: form.email.clone(),
            user: None,
        })
        .map(IntoResponse::into_response)
    };

    if form.password.len() < 8 {
        return again("Password must be at least 8 characters".to_string(), &form);
    }

    let password_hash = hash_password(&form.password)?;
    match state
        .content
        .register_user(&form.username, &form.email, &password_hash)
        .await
    {
        Ok(user) => Ok(session_redirect(&state, "/news", user.id)),
        Err(NewsroomError::Conflict(_)) => {
            again("That username or email is already taken".to_string(), &form)
        }
        Err(NewsroomError::Validation(message)) => again(message, &form),
        Err(other) => Err(other.into()),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| cookie_value(h, SESSION_COOKIE))
    {
        state.sessions.destroy(token);
    }
    let expired = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0");
    ([(header::SET_COOKIE, expired)], Redirect::to("/login")).into_response()
}
