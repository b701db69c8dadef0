//! HTTP handlers for the prediction endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use uuid::Uuid;

use shared::safe_image_filename;

use crate::error::{AppError, AppResult};
use crate::services::prediction::{ImageUpload, PredictionResponse, PredictionService};
use crate::AppState;

/// Run ripeness prediction over a batch of uploaded images.
///
/// Expects a multipart form with one or more parts named `files`. Parts with
/// empty bodies are skipped; a missing field and an all-empty field are
/// distinct input errors.
pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<PredictionResponse>> {
    let mut uploads = Vec::new();
    let mut saw_files_field = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.to_string()))?
    {
        if field.name() != Some("files") {
            continue;
        }
        saw_files_field = true;

        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidUpload(e.to_string()))?;
        if bytes.is_empty() {
            continue;
        }

        uploads.push(ImageUpload {
            filename: upload_filename(filename.as_deref()),
            bytes: bytes.to_vec(),
        });
    }

    if !saw_files_field {
        return Err(AppError::NoFilesUploaded);
    }
    if uploads.is_empty() {
        return Err(AppError::NoFilesProvided);
    }

    let service = PredictionService::new(&state);
    let response = service.process_batch(&uploads).await?;
    Ok(Json(response))
}

/// Sanitize a client filename, generating one for unnamed parts
fn upload_filename(raw: Option<&str>) -> String {
    raw.and_then(safe_image_filename)
        .map(str::to_string)
        .unwrap_or_else(|| format!("upload-{}.jpg", Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_filename_sanitizes() {
        assert_eq!(upload_filename(Some("tomato.jpg")), "tomato.jpg");
        assert_eq!(upload_filename(Some("a/b/tomato.jpg")), "tomato.jpg");
    }

    #[test]
    fn test_upload_filename_generates_for_unusable_names() {
        let generated = upload_filename(None);
        assert!(generated.starts_with("upload-"));
        assert!(generated.ends_with(".jpg"));

        let from_dot_dot = upload_filename(Some(".."));
        assert!(from_dot_dot.starts_with("upload-"));
    }
}
