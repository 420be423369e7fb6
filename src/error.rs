use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed the request.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Request failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Uploaded file exceeds the configured limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    /// Writing uploaded media to disk failed.
    #[error("media write failed")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// `NotFound` for the record `kind` with `id`, e.g. `Round with ID r1 not found`.
    pub fn not_found(kind: &str, id: &str) -> Self {
        ServiceError::NotFound(format!("{kind} with ID {id} not found"))
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected request body or parameters (400).
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unknown record (404).
    #[error("not found: {0}")]
    NotFound(String),
    /// Upload over the size limit (413).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    /// Storage is down or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Unexpected failure (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::PayloadTooLarge(message) => AppError::PayloadTooLarge(message),
            ServiceError::Io(err) => AppError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (self.status(), payload).into_response()
    }
}
