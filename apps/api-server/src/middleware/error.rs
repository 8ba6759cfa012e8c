//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use serif_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Conflict(String),
    TooManyRequests { retry_after_secs: u64 },
    Upstream(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::TooManyRequests { retry_after_secs } => {
                write!(f, "Too many requests, retry after {}s", retry_after_secs)
            }
            AppError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::TooManyRequests { .. } => ErrorResponse::too_many_requests(),
            AppError::Upstream(detail) => ErrorResponse::bad_gateway(detail),
            AppError::Internal(detail) => {
                // Log internal errors, never leak them to clients
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::TooManyRequests { retry_after_secs } = self {
            builder.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
        }
        builder.json(error)
    }
}

// Conversion from domain errors
impl From<serif_core::DomainError> for AppError {
    fn from(err: serif_core::DomainError) -> Self {
        match err {
            // Owner-scoped misses read exactly like missing posts, so a
            // caller cannot probe ids that belong to other accounts.
            serif_core::DomainError::OwnedLookupFailed => {
                AppError::NotFound("Post not found".to_string())
            }
            serif_core::DomainError::NotFound(entity) => {
                AppError::NotFound(format!("{} not found", entity))
            }
            serif_core::DomainError::Validation(msg) => AppError::BadRequest(msg),
            serif_core::DomainError::Conflict(msg) => AppError::Conflict(msg),
            serif_core::DomainError::Unauthorized => AppError::Unauthorized,
            serif_core::DomainError::Upstream(msg) => AppError::Upstream(msg),
            serif_core::DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<serif_core::error::RepoError> for AppError {
    fn from(err: serif_core::error::RepoError) -> Self {
        match err {
            serif_core::error::RepoError::NotFound => {
                AppError::NotFound("Resource not found".to_string())
            }
            serif_core::error::RepoError::Constraint(msg) => AppError::Conflict(msg),
            serif_core::error::RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            serif_core::error::RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<serif_core::ports::AuthError> for AppError {
    fn from(err: serif_core::ports::AuthError) -> Self {
        match err {
            serif_core::ports::AuthError::HashingError(msg) => {
                tracing::error!("Password hashing error: {}", msg);
                AppError::Internal("Authentication error".to_string())
            }
            _ => AppError::Unauthorized,
        }
    }
}

impl From<serif_core::ports::StorageError> for AppError {
    fn from(err: serif_core::ports::StorageError) -> Self {
        match err {
            serif_core::ports::StorageError::AlreadyExists(path) => {
                AppError::Conflict(format!("An object already exists at {}", path))
            }
            serif_core::ports::StorageError::Backend(msg) => {
                tracing::error!("Object storage error: {}", msg);
                AppError::Upstream("Storage error".to_string())
            }
        }
    }
}

impl From<serif_core::ports::ContactError> for AppError {
    fn from(err: serif_core::ports::ContactError) -> Self {
        match err {
            serif_core::ports::ContactError::Disabled => {
                AppError::Internal("Contact service not configured".to_string())
            }
            serif_core::ports::ContactError::Upstream(msg) => AppError::Upstream(msg),
        }
    }
}

impl From<serif_core::ports::MailError> for AppError {
    fn from(err: serif_core::ports::MailError) -> Self {
        match err {
            serif_core::ports::MailError::Delivery(msg) => {
                tracing::error!("Mail delivery error: {}", msg);
                AppError::Upstream("Email delivery failed".to_string())
            }
        }
    }
}

impl From<serif_core::ports::RateLimitError> for AppError {
    fn from(err: serif_core::ports::RateLimitError) -> Self {
        match err {
            serif_core::ports::RateLimitError::Backend(msg) => {
                tracing::error!("Rate limiter error: {}", msg);
                AppError::Internal("Rate limiter error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serif_core::DomainError;
    use serif_core::error::RepoError;

    #[test]
    fn owned_lookup_misses_read_as_missing_posts() {
        let err = AppError::from(DomainError::OwnedLookupFailed);
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Post not found"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn constraint_violations_become_conflicts() {
        let err = AppError::from(RepoError::Constraint(
            "A post with this slug already exists".to_string(),
        ));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn throttled_responses_carry_retry_after() {
        let response = AppError::TooManyRequests { retry_after_secs: 42 }.error_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok());
        assert_eq!(retry, Some("42"));
    }

    #[test]
    fn database_failures_are_not_leaked() {
        let err = AppError::from(RepoError::Query("syntax error at or near".to_string()));
        assert!(matches!(err, AppError::Internal(ref msg) if msg == "Database error"));
    }
}
