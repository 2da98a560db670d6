//! Custom error types for the API service

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{error::DatabaseError, models::ErrorBody};
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or rejected credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request collides with existing state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Body was not the JSON the route expects
    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Json(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            ApiError::Database(DatabaseError::NotFound { entity, .. }) => {
                (StatusCode::NOT_FOUND, format!("{} not found", entity))
            }
            ApiError::Database(DatabaseError::Conflict(what)) => {
                (StatusCode::CONFLICT, format!("{} already exists", what))
            }
            ApiError::Database(DatabaseError::OutOfRange(msg)) => (StatusCode::CONFLICT, msg),
            ApiError::Database(err) => {
                error!("Database failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: error_message })).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
