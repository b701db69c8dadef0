//! Error handling for the Tomato Ripeness Management Service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Upload errors
    #[error("No files uploaded")]
    NoFilesUploaded,

    #[error("No files provided")]
    NoFilesProvided,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("{0} not found")]
    NotFound(String),

    // External service errors
    #[error("Detection service error: {0}")]
    DetectionService(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Flat error body returned to clients
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NoFilesUploaded
            | AppError::NoFilesProvided
            | AppError::InvalidUpload(_)
            | AppError::InvalidFilename(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DetectionService(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        // Database details stay out of client responses
        let error = match &self {
            AppError::Database(_) => "A database error occurred".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
