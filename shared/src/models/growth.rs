//! Growth records and harvest estimation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ripeness::round_to;

/// Ripe share, in percent, at which a batch is considered ready to harvest
pub const TARGET_RIPE_PERCENT: f64 = 70.0;

/// Fallback growth speed (% ripe per day) when no stored speed is usable
pub const DEFAULT_GROWTH_SPEED: f64 = 5.0;

/// One appended observation of batch ripeness and the setpoints in force
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub ripe_percentage: f64,
    /// Daily ripe-percentage gain derived at append time
    pub growth_speed_ripe: f64,
    pub temperature_c: f64,
    pub light_intensity_lux: f64,
    pub humidity_percent: f64,
    pub created_at: DateTime<Utc>,
}

/// Days-to-harvest estimate returned with each prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarvestEstimate {
    pub estimated_days_to_harvest: f64,
    pub growth_speed_ripe: f64,
    pub target_ripe_percent: f64,
}

/// Days until the ripe share reaches the target, at the given daily speed.
///
/// `None` when the speed is zero or non-finite, instead of dividing by it.
/// A negative result means the target is already exceeded and is returned
/// as-is.
pub fn estimate_days_to_harvest(ripe_percentage: f64, growth_speed: f64) -> Option<f64> {
    if growth_speed == 0.0 || !growth_speed.is_finite() {
        return None;
    }

    Some(round_to(
        (TARGET_RIPE_PERCENT - ripe_percentage) / growth_speed,
        2,
    ))
}

/// Growth speed to store with a new record, given the previous one.
///
/// A positive observed speed over a positive elapsed interval wins; otherwise
/// the previous record's positive speed is carried, and the default covers
/// the rest.
pub fn derive_growth_speed(
    previous_ripe: f64,
    previous_speed: f64,
    elapsed_days: f64,
    ripe_percentage: f64,
) -> f64 {
    if elapsed_days > 0.0 {
        let observed = round_to((ripe_percentage - previous_ripe) / elapsed_days, 2);
        if observed > 0.0 && observed.is_finite() {
            return observed;
        }
    }

    if previous_speed > 0.0 && previous_speed.is_finite() {
        previous_speed
    } else {
        DEFAULT_GROWTH_SPEED
    }
}
