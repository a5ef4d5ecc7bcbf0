use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Outcome stored for an answer, echoed back on duplicate submissions.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PriorOutcome {
    pub is_correct: bool,
    pub running_score: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Item already answered in this session")]
    AlreadyAnswered(PriorOutcome),

    #[error("Clip view has not been consumed")]
    ViewNotConsumed,

    #[error("No eligible items match the requested filters")]
    InsufficientEligibleItems,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::NotAuthorized => (
                StatusCode::FORBIDDEN,
                json!({ "error": "not_authorized" }),
            ),
            Error::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": msg }),
            ),
            Error::InvalidState(msg) => (
                StatusCode::CONFLICT,
                json!({ "error": "invalid_state", "message": msg }),
            ),
            Error::AlreadyAnswered(prior) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "already_answered",
                    "is_correct": prior.is_correct,
                    "running_score": prior.running_score,
                }),
            ),
            Error::ViewNotConsumed => (
                StatusCode::CONFLICT,
                json!({ "error": "view_not_consumed" }),
            ),
            Error::InsufficientEligibleItems => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "insufficient_eligible_items" }),
            ),
            Error::InvalidPayload(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_payload", "message": msg }),
            ),
            Error::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_payload", "message": err.to_string() }),
            ),
            Error::Json(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_payload", "message": err.to_string() }),
            ),
            Error::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "database_error", "message": err.to_string() }),
            ),
            Error::Config(msg) | Error::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal_error", "message": msg }),
            ),
            Error::Anyhow(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal_error", "message": err.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
