// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Reasons the question selector can refuse to build an exam.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExamError {
    #[error("Subject '{0}' not found")]
    SubjectNotFound(String),

    #[error("None of the selected topics belong to this subject")]
    NoTopicsSelected,

    #[error("No questions match difficulty '{0}' in the selected topics")]
    NoMatchingQuestions(String),

    #[error("Only {available} questions available, at least {required} are needed")]
    InsufficientQuestions { available: usize, required: usize },
}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity (exam cannot be built from the request)
    Exam(ExamError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Exam(err @ ExamError::SubjectNotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Exam(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ExamError> for AppError {
    fn from(err: ExamError) -> Self {
        AppError::Exam(err)
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_errors_map_to_status_codes() {
        let not_found = AppError::from(ExamError::SubjectNotFound("x".into())).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let too_few = AppError::from(ExamError::InsufficientQuestions {
            available: 2,
            required: 5,
        })
        .into_response();
        assert_eq!(too_few.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let internal = AppError::InternalServerError("db down".into()).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
