//! Batch prediction pipeline
//!
//! Drives one request end to end: persist the uploads, run detection per
//! image, store annotated renders, aggregate stages, derive percentages and
//! setpoints, and hand the batch to the growth service.

use std::sync::Arc;

use serde::Serialize;

use shared::{
    recommend_setpoints, ripeness_percentages, ClassCatalog, DetectionAggregator,
    EnvironmentalRecommendation, HarvestEstimate, ReferenceTable, RipenessPercentages,
    StageBreakdown,
};

use crate::error::AppResult;
use crate::external::Detector;
use crate::services::growth::GrowthService;
use crate::services::image_store::ImageStore;
use crate::AppState;

/// One uploaded image, already read out of the multipart stream
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Response body for POST /predict
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub predictions: StageBreakdown,
    pub ripeness_percentages: RipenessPercentages,
    pub environmental_recommendations: EnvironmentalRecommendation,
    pub annotated_images: Vec<String>,
    pub harvest_estimate: HarvestEstimate,
}

/// Orchestrates the prediction pipeline for one request
pub struct PredictionService {
    detector: Arc<dyn Detector>,
    catalog: Arc<ClassCatalog>,
    confidence_threshold: f32,
    references: ReferenceTable,
    images: ImageStore,
    growth: GrowthService,
}

impl PredictionService {
    pub fn new(state: &AppState) -> Self {
        Self::with_components(
            state.detector.clone(),
            state.catalog.clone(),
            state.config.detector.confidence_threshold,
            ImageStore::new(&state.config.storage.predictions_dir),
            GrowthService::new(state.db.clone()),
        )
    }

    /// Assemble a pipeline from its parts (used by tests)
    pub fn with_components(
        detector: Arc<dyn Detector>,
        catalog: Arc<ClassCatalog>,
        confidence_threshold: f32,
        images: ImageStore,
        growth: GrowthService,
    ) -> Self {
        Self {
            detector,
            catalog,
            confidence_threshold,
            references: ReferenceTable::GREENHOUSE,
            images,
            growth,
        }
    }

    /// Process one batch of uploaded images sequentially
    pub async fn process_batch(&self, uploads: &[ImageUpload]) -> AppResult<PredictionResponse> {
        let mut aggregator = DetectionAggregator::new(&self.catalog);
        let mut annotated_images = Vec::new();

        for upload in uploads {
            self.images.save(&upload.filename, &upload.bytes).await?;

            let report = self
                .detector
                .detect(&upload.bytes, self.confidence_threshold)
                .await?;

            tracing::debug!(
                "Image {}: {} detections",
                upload.filename,
                report.detections.len()
            );

            if let Some(annotated) = &report.annotated_image {
                let annotated_name = format!("annotated_{}", upload.filename);
                self.images.save(&annotated_name, annotated).await?;
                annotated_images.push(annotated_name);
            }

            aggregator.record_all(&report.detections);
        }

        let predictions = aggregator.finish();
        let percentages = ripeness_percentages(&predictions.counts());
        let recommendations = recommend_setpoints(&percentages, &self.references);
        let harvest_estimate = self.growth.estimate(percentages.ripe).await;
        self.growth
            .record_batch(&percentages, &recommendations)
            .await;

        tracing::info!(
            "Processed {} images: {:.2}% ripe, {:.2} days to harvest",
            uploads.len(),
            percentages.ripe,
            harvest_estimate.estimated_days_to_harvest
        );

        Ok(PredictionResponse {
            predictions,
            ripeness_percentages: percentages,
            environmental_recommendations: recommendations,
            annotated_images,
            harvest_estimate,
        })
    }
}
