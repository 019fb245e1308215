use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsroomError {
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {message}")]
    Database { message: String },

    #[error("mail error: {0}")]
    Mail(String),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NewsroomError {
    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            what,
            id: id.to_string(),
        }
    }

    pub fn database(message: impl ToString) -> Self {
        Self::Database {
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsroomError>;
