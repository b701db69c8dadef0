//! HTTP handlers for stored prediction images

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::AppResult;
use crate::services::image_store::{content_type_for, ImageStore};
use crate::AppState;

/// Serve a previously stored original or annotated image
pub async fn get_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let store = ImageStore::new(&state.config.storage.predictions_dir);
    let bytes = store.load(&filename).await?;

    let headers = [(header::CONTENT_TYPE, content_type_for(&filename))];
    Ok((headers, bytes).into_response())
}
