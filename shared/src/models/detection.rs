//! Object detection models
//!
//! Wire-independent shapes for what the external detector returns. The
//! aggregation pipeline reads only labels and confidences; bounding boxes are
//! carried through for clients that render overlays.

use serde::{Deserialize, Serialize};

/// A single detection returned by the object detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Raw class label, e.g. `b_half_ripened`
    pub label: String,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: None,
        }
    }
}

/// Axis-aligned bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}
