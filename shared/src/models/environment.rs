//! Environmental setpoint recommendations

use serde::{Serialize, Serializer};

use super::ripeness::{round_to, RipenessPercentages};

/// Reference setpoints for one ripeness stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageReference {
    pub temperature_c: f64,
    pub light_lux: f64,
    pub humidity_rh: f64,
}

/// Per-stage reference setpoints the recommendation blend interpolates over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceTable {
    pub unripe: StageReference,
    pub half_ripe: StageReference,
    pub ripe: StageReference,
}

impl ReferenceTable {
    /// Greenhouse midpoints for tomato ripening stages
    pub const GREENHOUSE: ReferenceTable = ReferenceTable {
        unripe: StageReference {
            temperature_c: 20.0,
            light_lux: 7000.0,
            humidity_rh: 90.0,
        },
        half_ripe: StageReference {
            temperature_c: 22.0,
            light_lux: 5000.0,
            humidity_rh: 80.0,
        },
        ripe: StageReference {
            temperature_c: 24.0,
            light_lux: 3000.0,
            humidity_rh: 72.5,
        },
    };
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::GREENHOUSE
    }
}

/// A recommended value with its display unit.
///
/// Renders and serializes as `<value> <unit>` with at least one and at most
/// two decimals: "24.0 °C", "72.5 %RH", "21.85 °C".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoint {
    pub value: f64,
    pub unit: &'static str,
}

impl Setpoint {
    pub fn new(value: f64, unit: &'static str) -> Self {
        Self { value, unit }
    }
}

impl std::fmt::Display for Setpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = format!("{:.2}", self.value);
        let trimmed = rendered.strip_suffix('0').unwrap_or(&rendered);
        write!(f, "{} {}", trimmed, self.unit)
    }
}

impl Serialize for Setpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Recommended environmental setpoints for one batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentalRecommendation {
    pub temperature_setpoint: Setpoint,
    pub light_intensity_setpoint: Setpoint,
    pub humidity_setpoint: Setpoint,
}

/// Blend per-stage references by percentage share.
///
/// Linear interpolation across the three anchors, rounded to 2 decimals.
/// Callers are trusted to pass shares from `ripeness_percentages`, so no
/// clamping is applied; an all-zero input yields all-zero setpoints.
pub fn recommend_setpoints(
    percentages: &RipenessPercentages,
    references: &ReferenceTable,
) -> EnvironmentalRecommendation {
    let blend = |pick: fn(&StageReference) -> f64| {
        round_to(
            (percentages.unripe * pick(&references.unripe)
                + percentages.half_ripe * pick(&references.half_ripe)
                + percentages.ripe * pick(&references.ripe))
                / 100.0,
            2,
        )
    };

    EnvironmentalRecommendation {
        temperature_setpoint: Setpoint::new(blend(|r| r.temperature_c), "°C"),
        light_intensity_setpoint: Setpoint::new(blend(|r| r.light_lux), "lux"),
        humidity_setpoint: Setpoint::new(blend(|r| r.humidity_rh), "%RH"),
    }
}
