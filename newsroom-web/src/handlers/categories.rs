//! Category listing and subscribe/unsubscribe.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use uuid::Uuid;

use newsroom_core::services::subscriptions::{self, SubscribeOutcome, UnsubscribeOutcome};
use newsroom_core::storage::Storage;
use newsroom_core::NewsroomError;

use crate::error::{render, WebResult};
use crate::models::{CategoryRow, NoticeQuery};
use crate::state::{AppState, CurrentUser, MaybeUser};
use crate::templates::CategoriesTemplate;

use super::user_view;

fn notice_text(code: &str) -> Option<String> {
    let text = match code {
        "subscribed" => "Subscribed. New posts in this category will reach you by mail.",
        "already-subscribed" => "You are already subscribed to that category.",
        "unsubscribed" => "Unsubscribed.",
        "not-subscribed" => "You were not subscribed to that category.",
        _ => return None,
    };
    Some(text.to_string())
}

pub async fn categories_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<NoticeQuery>,
) -> WebResult<Html<String>> {
    let subscribed: HashSet<Uuid> = match &user {
        Some(user) => state
            .storage
            .subscribed_category_ids(user.id)
            .await?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };

    let categories = state
        .storage
        .list_categories()
        .await?
        .into_iter()
        .map(|category| CategoryRow {
            id: category.id.to_string(),
            subscribed: subscribed.contains(&category.id),
            name: category.name,
        })
        .collect();

    render(CategoriesTemplate {
        categories,
        notice: query.notice.as_deref().and_then(notice_text),
        user: user_view(&state, &user).await?,
    })
}

async fn existing_category(state: &AppState, category_id: Uuid) -> WebResult<Uuid> {
    state
        .storage
        .get_category_by_id(category_id)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| NewsroomError::not_found("category", category_id).into())
}

pub async fn subscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
) -> WebResult<Redirect> {
    let category_id = existing_category(&state, category_id).await?;
    let notice = match subscriptions::subscribe(state.storage.as_ref(), user.id, category_id).await? {
        SubscribeOutcome::Subscribed => "subscribed",
        SubscribeOutcome::AlreadySubscribed => "already-subscribed",
    };
    Ok(Redirect::to(&format!("/categories?notice={notice}")))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
) -> WebResult<Redirect> {
    let category_id = existing_category(&state, category_id).await?;
    let notice = match subscriptions::unsubscribe(state.storage.as_ref(), user.id, category_id).await?
    {
        UnsubscribeOutcome::Unsubscribed => "unsubscribed",
        UnsubscribeOutcome::NotSubscribed => "not-subscribed",
    };
    Ok(Redirect::to(&format!("/categories?notice={notice}")))
}
