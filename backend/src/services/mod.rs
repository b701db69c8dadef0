//! Business logic services for the Tomato Ripeness Management Service

pub mod growth;
pub mod image_store;
pub mod prediction;

pub use growth::GrowthService;
pub use image_store::ImageStore;
pub use prediction::PredictionService;
