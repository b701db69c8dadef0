//! Prediction image storage
//!
//! Stores uploaded originals and detector-annotated renders under the
//! configured predictions directory and serves them back by filename.

use std::path::{Path, PathBuf};

use shared::validate_image_filename;

use crate::error::{AppError, AppResult};

/// Filesystem store for prediction images
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the store directory if it does not exist yet
    pub async fn ensure_root(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Persist image bytes under a bare filename; an existing file with the
    /// same name is overwritten
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> AppResult<()> {
        let path = self.image_path(filename)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Load stored image bytes by bare filename
    pub async fn load(&self, filename: &str) -> AppResult<Vec<u8>> {
        let path = self.image_path(filename)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Image '{}'", filename)))
            }
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn image_path(&self, filename: &str) -> AppResult<PathBuf> {
        validate_image_filename(filename)
            .map_err(|_| AppError::InvalidFilename(filename.to_string()))?;
        Ok(self.root.join(filename))
    }
}

/// Content type for a stored image, by extension; the detector emits jpeg
pub fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        Some(ext) if ext.eq_ignore_ascii_case("webp") => "image/webp",
        Some(ext) if ext.eq_ignore_ascii_case("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}
