use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

// 2067 = SQLite Unique Constraint
// 23505 = PostgreSQL Unique Violation
const UNIQUE_VIOLATION_CODES: [&str; 2] = ["2067", "23505"];

// 5 / 6 = SQLite busy / locked (plus extended variants)
// 40001 = PostgreSQL serialization failure, 40P01 = deadlock detected
const TRANSIENT_CODES: [&str; 6] = ["5", "6", "261", "517", "40001", "40P01"];

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Course is full: {0}")]
    CourseFull(String),
    #[error("Course already booked by this user")]
    DuplicateBooking,
    #[error("Last seat taken concurrently: {0}")]
    ConcurrencyConflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// True when the failure came from the store rather than a business rule and the
    /// same call may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Database(e) => match e {
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed => true,
                sqlx::Error::Database(db_err) => db_err
                    .code()
                    .is_some_and(|code| TRANSIENT_CODES.iter().any(|c| code == *c)),
                _ => false,
            },
            _ => false,
        }
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db_err| {
        db_err.is_unique_violation()
            || db_err.code().is_some_and(|code| UNIQUE_VIOLATION_CODES.iter().any(|c| code == *c))
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)" }))
                    ).into_response();
                }

                error!(retryable = self.is_retryable(), "Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Operation failed, try again".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::CourseFull(_) => (StatusCode::CONFLICT, "Course is full".to_string()),
            AppError::ConcurrencyConflict(course_id) => {
                warn!("Seat race lost on course {}", course_id);
                (StatusCode::CONFLICT, "Course is full".to_string())
            }
            AppError::DuplicateBooking => (StatusCode::CONFLICT, "You have already booked this course".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
