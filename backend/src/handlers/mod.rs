//! HTTP request handlers for the Tomato Ripeness Management Service

pub mod growth;
pub mod health;
pub mod images;
pub mod predict;

pub use growth::latest_growth_record;
pub use health::health_check;
pub use images::get_image;
pub use predict::predict;
