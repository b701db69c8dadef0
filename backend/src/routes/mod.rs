//! Route definitions for the Tomato Ripeness Management Service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Prediction pipeline
        .route("/predict", post(handlers::predict))
        // Stored original and annotated images
        .route("/get_image/:filename", get(handlers::get_image))
        // Growth history
        .route("/growth/latest", get(handlers::latest_growth_record))
}
