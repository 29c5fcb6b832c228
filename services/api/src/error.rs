//! Custom error types for the API service
//!
//! Domain rule violations are carried as typed `DomainError` variants so
//! handlers and tests branch on structured data rather than message strings.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Domain rule violations raised by the repositories
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Class not found")]
    ClassNotFound,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Enrollment not found")]
    EnrollmentNotFound,

    #[error("Waitlist entry not found")]
    WaitlistEntryNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("User already enrolled in this class")]
    AlreadyEnrolled,

    #[error("Session has already started or ended")]
    SessionStarted,

    #[error("Enrollment is not pending")]
    EnrollmentNotPending,

    #[error("Enrollment is not approved")]
    EnrollmentNotApproved,

    #[error("Waitlist is not enabled for this class")]
    WaitlistNotEnabled,

    #[error("Waitlist is full")]
    WaitlistFull,

    #[error("User is already on the waitlist for this class")]
    AlreadyOnWaitlist,

    #[error("Invalid waitlist status: {status}")]
    InvalidWaitlistStatus { status: String },

    /// Unexpected database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl DomainError {
    /// HTTP status code this violation maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::ClassNotFound
            | DomainError::SessionNotFound
            | DomainError::EnrollmentNotFound
            | DomainError::WaitlistEntryNotFound
            | DomainError::UserNotFound => StatusCode::NOT_FOUND,

            DomainError::AlreadyEnrolled
            | DomainError::SessionStarted
            | DomainError::EnrollmentNotPending
            | DomainError::EnrollmentNotApproved
            | DomainError::WaitlistNotEnabled
            | DomainError::WaitlistFull
            | DomainError::AlreadyOnWaitlist
            | DomainError::InvalidWaitlistStatus { .. } => StatusCode::BAD_REQUEST,

            DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but lacking the required role
    #[error("Forbidden")]
    Forbidden,

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found with message
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Domain rule violation
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Domain(err) => {
                let status = err.status_code();
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Database error: {}", err);
                    (status, "Internal server error".to_string())
                } else {
                    (status, err.to_string())
                }
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_violations_map_to_bad_request() {
        assert_eq!(
            DomainError::AlreadyEnrolled.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::SessionStarted.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::WaitlistNotEnabled.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::WaitlistFull.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::EnrollmentNotPending.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_missing_resources_map_to_not_found() {
        assert_eq!(
            DomainError::ClassNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DomainError::SessionNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DomainError::EnrollmentNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_error_messages_are_stable() {
        // Clients and tests rely on these exact strings.
        assert_eq!(
            DomainError::AlreadyEnrolled.to_string(),
            "User already enrolled in this class"
        );
        assert_eq!(
            DomainError::SessionStarted.to_string(),
            "Session has already started or ended"
        );
        assert_eq!(
            DomainError::WaitlistNotEnabled.to_string(),
            "Waitlist is not enabled for this class"
        );
        assert_eq!(DomainError::WaitlistFull.to_string(), "Waitlist is full");
    }

    #[test]
    fn test_database_errors_are_masked() {
        let err = ApiError::Domain(DomainError::Database(sqlx::Error::RowNotFound));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_domain_error_renders_its_message() {
        let response = ApiError::Domain(DomainError::WaitlistFull).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
