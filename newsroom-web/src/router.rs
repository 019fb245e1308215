use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::handlers::{auth, categories, posts, profiles};
use crate::state::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(auth::root))
        .route("/news", get(posts::news_list))
        .route("/news/create", get(posts::news_create_form).post(posts::news_create))
        .route("/news/:id", get(posts::news_detail))
        .route("/news/:id/edit", get(posts::news_edit_form).post(posts::news_edit))
        .route("/news/:id/delete", post(posts::news_delete))
        .route("/news/:id/like", post(posts::like_post))
        .route("/news/:id/dislike", post(posts::dislike_post))
        .route("/news/:id/comments", post(posts::add_comment))
        .route("/comments/:id/like", post(posts::like_comment))
        .route("/comments/:id/dislike", post(posts::dislike_comment))
        .route("/search", get(posts::news_search))
        .route("/categories", get(categories::categories_page))
        .route("/categories/:id/subscribe", post(categories::subscribe))
        .route("/categories/:id/unsubscribe", post(categories::unsubscribe))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/profile", get(profiles::profile_page).post(profiles::profile_update))
        .route("/profile/become-author", post(profiles::become_author))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}
