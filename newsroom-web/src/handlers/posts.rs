//! Post, search and comment handlers.

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::NaiveDate;
use uuid::Uuid;

use newsroom_core::domain::{Post, PostKind};
use newsroom_core::services::ratings;
use newsroom_core::services::roles::{self, Permission};
use newsroom_core::storage::{PostSearch, Storage};
use newsroom_core::NewsroomError;

use crate::error::{render, WebError, WebResult};
use crate::models::{
    comment_view, format_timestamp, CommentForm, PageQuery, PostDetailView, PostForm, SearchQuery,
};
use crate::state::{AppState, CurrentUser, MaybeUser};
use crate::templates::{NewsDetailTemplate, NewsListTemplate, PostFormTemplate, SearchTemplate};

use super::{author_username, post_to_view, user_view};

const PAGE_SIZE: i64 = 10;

pub async fn news_list(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(page_query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    let page = page_query.page.unwrap_or(1).max(1);
    let offset = (page as i64 - 1) * PAGE_SIZE;

    let posts = state.storage.list_posts(PAGE_SIZE, offset).await?;
    let total = state.storage.count_posts().await?;
    let total_pages = (total.max(1) + PAGE_SIZE - 1) / PAGE_SIZE;

    let mut views = Vec::with_capacity(posts.len());
    for post in &posts {
        views.push(post_to_view(&state, post).await?);
    }

    render(NewsListTemplate {
        posts: views,
        page,
        prev_page: (page > 1).then(|| page - 1),
        next_page: ((page as i64) < total_pages).then(|| page + 1),
        user: user_view(&state, &user).await?,
    })
}

pub async fn news_detail(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(post_id): Path<Uuid>,
) -> WebResult<Html<String>> {
    // Cache-first read of the post row itself.
    let post = match state.post_cache.get(&post_id) {
        Some(post) => post,
        None => {
            let post = state
                .storage
                .get_post(post_id)
                .await?
                .ok_or_else(|| NewsroomError::not_found("post", post_id))?;
            state.post_cache.insert(post_id, post.clone());
            post
        }
    };

    let username = author_username(&state, &post).await?;
    let categories = state
        .storage
        .categories_of_post(post.id)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();

    let can_edit = match &user {
        Some(user) => is_post_owner(&state, user.id, &post).await?,
        None => false,
    };

    let mut comments = Vec::new();
    for comment in state.storage.comments_for_post(post.id).await? {
        let commenter = state.storage.get_user_by_id(comment.user_id).await?;
        comments.push(comment_view(&comment, commenter.as_ref()));
    }

    render(NewsDetailTemplate {
        post: PostDetailView {
            id: post.id.to_string(),
            title: post.title.clone(),
            kind: post.kind.label(),
            author: username,
            rating: post.rating,
            created_at: format_timestamp(&post.created_at),
            content: post.content.clone(),
            categories,
            can_edit,
        },
        comments,
        user: user_view(&state, &user).await?,
    })
}

pub async fn news_search(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<SearchQuery>,
) -> WebResult<Html<String>> {
    let since = query
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc());

    let search = PostSearch {
        title: query.q.clone().filter(|s| !s.is_empty()),
        author_username: query.author.clone().filter(|s| !s.is_empty()),
        since,
    };
    let posts = state.storage.search_posts(&search).await?;

    let mut views = Vec::with_capacity(posts.len());
    for post in &posts {
        views.push(post_to_view(&state, post).await?);
    }

    render(SearchTemplate {
        posts: views,
        q: query.q.unwrap_or_default(),
        author: query.author.unwrap_or_default(),
        date: query.date.unwrap_or_default(),
        user: user_view(&state, &user).await?,
    })
}

/// The acting user must own the post and hold the change permission.
async fn is_post_owner(state: &AppState, user_id: Uuid, post: &Post) -> WebResult<bool> {
    let Some(author) = state.storage.get_author_by_id(post.author_id).await? else {
        return Ok(false);
    };
    if author.user_id != user_id {
        return Ok(false);
    }
    Ok(roles::has_permission(state.storage.as_ref(), user_id, Permission::ChangePost).await?)
}

async fn require_add_permission(state: &AppState, user_id: Uuid) -> WebResult<()> {
    if roles::has_permission(state.storage.as_ref(), user_id, Permission::AddPost).await? {
        Ok(())
    } else {
        Err(WebError(NewsroomError::Unauthorized(
            "author permission required".to_string(),
        )))
    }
}

async fn editable_post(state: &AppState, user_id: Uuid, post_id: Uuid) -> WebResult<Post> {
    let post = state
        .storage
        .get_post(post_id)
        .await?
        .ok_or_else(|| NewsroomError::not_found("post", post_id))?;
    if !is_post_owner(state, user_id, &post).await? {
        return Err(WebError(NewsroomError::Unauthorized(
            "only the author can change this post".to_string(),
        )));
    }
    Ok(post)
}

fn post_form_page(
    heading: &'static str,
    action: String,
    form: &PostForm,
    error: Option<String>,
    user: Option<crate::models::UserView>,
) -> WebResult<Html<String>> {
    render(PostFormTemplate {
        heading,
        action,
        kind: form.kind.clone(),
        title_value: form.title.clone(),
        content_value: form.content.clone(),
        categories_value: form.categories.clone(),
        error,
        user,
    })
}

pub async fn news_create_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Html<String>> {
    require_add_permission(&state, user.id).await?;
    let empty = PostForm {
        kind: "news".to_string(),
        title: String::new(),
        content: String::new(),
        categories: String::new(),
    };
    post_form_page(
        "Create post",
        "/news/create".to_string(),
        &empty,
        None,
        Some(super::nav_user(&state, &user).await?),
    )
}

/// Resolve a comma-separated list of category names to ids, or report the
/// first unknown name.
async fn resolve_categories(
    state: &AppState,
    names: &str,
) -> WebResult<Result<Vec<Uuid>, String>> {
    let mut ids = Vec::new();
    for name in names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match state.storage.get_category_by_name(name).await? {
            Some(category) => ids.push(category.id),
            None => return Ok(Err(format!("Unknown category '{name}'"))),
        }
    }
    Ok(Ok(ids))
}

pub async fn news_create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    axum::extract::Form(form): axum::extract::Form<PostForm>,
) -> WebResult<Response> {
    require_add_permission(&state, user.id).await?;
    let author = state
        .storage
        .get_author_by_user(user.id)
        .await?
        .ok_or_else(|| NewsroomError::Unauthorized("author profile missing".to_string()))?;

    let nav = Some(super::nav_user(&state, &user).await?);
    let kind: PostKind = match form.kind.parse() {
        Ok(kind) => kind,
        Err(_) => {
            return Ok(post_form_page(
                "Create post",
                "/news/create".to_string(),
                &form,
                Some("Pick a valid post kind".to_string()),
                nav,
            )?
            .into_response())
        }
    };
    let category_ids = match resolve_categories(&state, &form.categories).await? {
        Ok(ids) => ids,
        Err(message) => {
            return Ok(post_form_page(
                "Create post",
                "/news/create".to_string(),
                &form,
                Some(message),
                nav,
            )?
            .into_response())
        }
    };

    match state
        .content
        .create_post(author.id, kind, &form.title, &form.content, &category_ids)
        .await
    {
        Ok(post) => Ok(Redirect::to(&format!("/news/{}", post.id)).into_response()),
        Err(NewsroomError::Validation(message)) => Ok(post_form_page(
            "Create post",
            "/news/create".to_string(),
            &form,
            Some(message),
            nav,
        )?
        .into_response()),
        Err(other) => Err(other.into()),
    }
}

pub async fn news_edit_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> WebResult<Html<String>> {
    let post = editable_post(&state, user.id, post_id).await?;
    let categories = state
        .storage
        .categories_of_post(post.id)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ");

    let form = PostForm {
        kind: post.kind.as_str().to_string(),
        title: post.title.clone(),
        content: post.content.clone(),
        categories,
    };
    post_form_page(
        "Edit post",
        format!("/news/{post_id}/edit"),
        &form,
        None,
        Some(super::nav_user(&state, &user).await?),
    )
}

pub async fn news_edit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<Uuid>,
    axum::extract::Form(form): axum::extract::Form<PostForm>,
) -> WebResult<Response> {
    let mut post = editable_post(&state, user.id, post_id).await?;

    let nav = Some(super::nav_user(&state, &user).await?);
    let kind: PostKind = match form.kind.parse() {
        Ok(kind) => kind,
        Err(_) => {
            return Ok(post_form_page(
                "Edit post",
                format!("/news/{post_id}/edit"),
                &form,
                Some("Pick a valid post kind".to_string()),
                nav,
            )?
            .into_response())
        }
    };

    post.kind = kind;
    post.title = form.title.trim().to_string();
    post.content = form.content.clone();
    if post.title.is_empty() {
        return Ok(post_form_page(
            "Edit post",
            format!("/news/{post_id}/edit"),
            &form,
            Some("Title must not be empty".to_string()),
            nav,
        )?
        .into_response());
    }

    state.storage.update_post(&post).await?;
    // Attach any newly listed categories; existing ones are untouched.
    match resolve_categories(&state, &form.categories).await? {
        Ok(ids) => {
            for category_id in ids {
                state.content.attach_category(&post, category_id).await?;
            }
        }
        Err(message) => {
            return Ok(post_form_page(
                "Edit post",
                format!("/news/{post_id}/edit"),
                &form,
                Some(message),
                nav,
            )?
            .into_response())
        }
    }
    state.post_cache.remove(&post_id);

    Ok(Redirect::to(&format!("/news/{post_id}")).into_response())
}

pub async fn news_delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> WebResult<Redirect> {
    editable_post(&state, user.id, post_id).await?;
    state.storage.delete_post(post_id).await?;
    state.post_cache.remove(&post_id);
    Ok(Redirect::to("/news"))
}

pub async fn like_post(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> WebResult<Redirect> {
    ratings::like_post(state.storage.as_ref(), post_id).await?;
    state.post_cache.remove(&post_id);
    Ok(Redirect::to(&format!("/news/{post_id}")))
}

pub async fn dislike_post(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> WebResult<Redirect> {
    ratings::dislike_post(state.storage.as_ref(), post_id).await?;
    state.post_cache.remove(&post_id);
    Ok(Redirect::to(&format!("/news/{post_id}")))
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<Uuid>,
    axum::extract::Form(form): axum::extract::Form<CommentForm>,
) -> WebResult<Redirect> {
    state.content.create_comment(post_id, user.id, &form.body).await?;
    Ok(Redirect::to(&format!("/news/{post_id}")))
}

pub async fn like_comment(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(comment_id): Path<Uuid>,
) -> WebResult<Redirect> {
    let comment = state
        .storage
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| NewsroomError::not_found("comment", comment_id))?;
    ratings::like_comment(state.storage.as_ref(), comment_id).await?;
    Ok(Redirect::to(&format!("/news/{}", comment.post_id)))
}

pub async fn dislike_comment(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(comment_id): Path<Uuid>,
) -> WebResult<Redirect> {
    let comment = state
        .storage
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| NewsroomError::not_found("comment", comment_id))?;
    ratings::dislike_comment(state.storage.as_ref(), comment_id).await?;
    Ok(Redirect::to(&format!("/news/{}", comment.post_id)))
}
