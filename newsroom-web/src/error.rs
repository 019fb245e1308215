//! Maps the core error taxonomy onto HTTP responses: not-found lookups
//! become 404s, authorization failures a denied-access page, everything
//! else a logged server error.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::error;

use newsroom_core::NewsroomError;

pub struct WebError(pub NewsroomError);

pub type WebResult<T> = std::result::Result<T, WebError>;

impl From<NewsroomError> for WebError {
    fn from(err: NewsroomError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self.0 {
            NewsroomError::NotFound { what, .. } => (
                StatusCode::NOT_FOUND,
                Html(format!("<h1>Not found</h1><p>No such {what}.</p>")),
            )
                .into_response(),
            NewsroomError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                Html("<h1>Bad request</h1>".to_string()),
            )
                .into_response(),
            NewsroomError::Unauthorized(_) => (
                StatusCode::FORBIDDEN,
                Html("<h1>Access denied</h1>".to_string()),
            )
                .into_response(),
            NewsroomError::Conflict(_) => (
                StatusCode::CONFLICT,
                Html("<h1>Conflict</h1>".to_string()),
            )
                .into_response(),
            other => {
                error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>Server error</h1>".to_string()),
                )
                    .into_response()
            }
        }
    }
}

/// Rejection for handlers that need a logged-in user: send them to the
/// login page instead of a bare status code.
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

/// Render a template into a response, mapping render failures onto the
/// server-error branch.
pub fn render<T: Template>(template: T) -> WebResult<Html<String>> {
    template
        .render()
        .map(Html)
        .map_err(|e| WebError(NewsroomError::database(format!("template rendering failed: {e}"))))
}
