//! External API integrations

pub mod detector;

pub use detector::{DetectionReport, Detector, HttpDetectorClient};
