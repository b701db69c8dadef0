//! Object Detection Client
//!
//! Client for the tomato ripeness detection microservice. Images are sent
//! base64-encoded; the service answers with labeled detections and, when
//! annotation is enabled server-side, an annotated render of the input.

use axum::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use shared::{BoundingBox, Detection};

use crate::error::{AppError, AppResult};

/// What one detector call yields for one image
#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub detections: Vec<Detection>,
    /// Annotated render of the input, when the detector produced one
    pub annotated_image: Option<Vec<u8>>,
}

/// Capability interface over the external object detector.
///
/// The prediction pipeline depends on this trait only, so tests run against
/// canned detections without model weights or network access.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detect tomatoes in one image; detections below the threshold are
    /// filtered by the detector itself
    async fn detect(&self, image: &[u8], confidence_threshold: f32) -> AppResult<DetectionReport>;
}

/// HTTP client for the detection microservice
#[derive(Clone)]
pub struct HttpDetectorClient {
    endpoint: String,
    api_key: Option<String>,
    http_client: Client,
}

/// Request to run detection on one image
#[derive(Debug, Serialize)]
pub struct DetectImageRequest {
    pub image_base64: String,
    pub confidence_threshold: f32,
}

/// Response from the detection API
#[derive(Debug, Deserialize)]
pub struct DetectImageResponse {
    pub detections: Vec<DetectionDto>,
    pub annotated_image_base64: Option<String>,
    pub model_version: Option<String>,
    pub processing_time_ms: Option<i64>,
}

/// One detection from the API
#[derive(Debug, Deserialize)]
pub struct DetectionDto {
    pub label: String,
    pub confidence: f32,
    pub bbox: Option<BoundingBoxDto>,
}

/// Bounding box corners from the API
#[derive(Debug, Deserialize)]
pub struct BoundingBoxDto {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl From<BoundingBoxDto> for BoundingBox {
    fn from(b: BoundingBoxDto) -> Self {
        BoundingBox {
            x1: b.x1,
            y1: b.y1,
            x2: b.x2,
            y2: b.y2,
        }
    }
}

impl From<DetectionDto> for Detection {
    fn from(d: DetectionDto) -> Self {
        Detection {
            label: d.label,
            confidence: d.confidence,
            bbox: d.bbox.map(Into::into),
        }
    }
}

impl HttpDetectorClient {
    /// Create a new detection client
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint,
            api_key,
            http_client,
        }
    }
}

#[async_trait]
impl Detector for HttpDetectorClient {
    async fn detect(&self, image: &[u8], confidence_threshold: f32) -> AppResult<DetectionReport> {
        let request = DetectImageRequest {
            image_base64: BASE64.encode(image),
            confidence_threshold,
        };

        let url = format!("{}/detect", self.endpoint);
        let mut builder = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.api_key {
            builder = builder.header("x-api-key", api_key);
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::DetectionService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::DetectionService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: DetectImageResponse = response
            .json()
            .await
            .map_err(|e| AppError::DetectionService(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(
            "Detector returned {} detections (model: {}, {} ms)",
            result.detections.len(),
            result.model_version.as_deref().unwrap_or("unknown"),
            result.processing_time_ms.unwrap_or(-1)
        );

        let annotated_image = match result.annotated_image_base64 {
            Some(encoded) => Some(BASE64.decode(encoded).map_err(|e| {
                AppError::DetectionService(format!("Invalid annotated image: {}", e))
            })?),
            None => None,
        };

        Ok(DetectionReport {
            detections: result.detections.into_iter().map(Into::into).collect(),
            annotated_image,
        })
    }
}
