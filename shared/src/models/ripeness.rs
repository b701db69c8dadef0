//! Ripeness stage classification and per-batch aggregation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::detection::Detection;

/// Default detector class list: two cultivars ("b" large-fruit, "l"
/// small-fruit), three stages each, fully ripened first within each cultivar.
pub const DEFAULT_CLASS_NAMES: [&str; 6] = [
    "b_fully_ripened",
    "b_half_ripened",
    "b_green",
    "l_fully_ripened",
    "l_half_ripened",
    "l_green",
];

/// Ripeness stage buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RipenessStage {
    Unripe,
    HalfRipe,
    Ripe,
}

impl RipenessStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RipenessStage::Unripe => "unripe",
            RipenessStage::HalfRipe => "half-ripe",
            RipenessStage::Ripe => "ripe",
        }
    }
}

impl std::fmt::Display for RipenessStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lookup table from raw detector labels to ripeness stages.
///
/// Built from an ordered class list where each cultivar contributes three
/// consecutive entries: fully ripened, half ripened, green. Position i maps
/// by i mod 3 (0 ripe, 1 half-ripe, 2 unripe), which for the default list
/// places indices 0 and 3 in ripe, 1 and 4 in half-ripe, 2 and 5 in unripe.
/// Labels outside the catalog classify to `None` rather than erroring, so a
/// detector with drifted labels degrades to the unknown bucket.
#[derive(Debug, Clone)]
pub struct ClassCatalog {
    stages: HashMap<String, RipenessStage>,
}

impl ClassCatalog {
    /// Build a catalog from an ordered, cultivar-interleaved class list
    pub fn from_class_names<S: AsRef<str>>(names: &[S]) -> Self {
        let stages = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let stage = match i % 3 {
                    0 => RipenessStage::Ripe,
                    1 => RipenessStage::HalfRipe,
                    _ => RipenessStage::Unripe,
                };
                (name.as_ref().to_string(), stage)
            })
            .collect();

        Self { stages }
    }

    /// Stage for a raw label; `None` for labels outside the catalog
    pub fn stage_for(&self, label: &str) -> Option<RipenessStage> {
        self.stages.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::from_class_names(&DEFAULT_CLASS_NAMES)
    }
}

/// Count and mean confidence for one stage bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageAggregate {
    pub count: u32,
    /// Arithmetic mean of confidences, 4 decimal places; 0 when count is 0
    pub average_confidence: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ScoreAccumulator {
    count: u32,
    confidence_sum: f64,
}

impl ScoreAccumulator {
    fn record(&mut self, confidence: f32) {
        self.count += 1;
        self.confidence_sum += f64::from(confidence);
    }

    fn aggregate(&self) -> StageAggregate {
        let average_confidence = if self.count > 0 {
            round_to(self.confidence_sum / f64::from(self.count), 4)
        } else {
            0.0
        };

        StageAggregate {
            count: self.count,
            average_confidence,
        }
    }
}

/// Per-stage aggregates for one processed batch.
///
/// Stages that saw no detections are omitted from the serialized form. The
/// unknown bucket collects labels outside the catalog; it is reported here
/// but never feeds the percentage denominator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unripe: Option<StageAggregate>,
    #[serde(rename = "half-ripe", skip_serializing_if = "Option::is_none")]
    pub half_ripe: Option<StageAggregate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ripe: Option<StageAggregate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown: Option<StageAggregate>,
}

impl StageBreakdown {
    /// Counts of the three named stages (unknown excluded)
    pub fn counts(&self) -> StageCounts {
        StageCounts {
            unripe: self.unripe.map_or(0, |a| a.count),
            half_ripe: self.half_ripe.map_or(0, |a| a.count),
            ripe: self.ripe.map_or(0, |a| a.count),
        }
    }
}

/// Detection counts for the three named ripeness stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub unripe: u32,
    pub half_ripe: u32,
    pub ripe: u32,
}

impl StageCounts {
    pub fn total(&self) -> u32 {
        self.unripe + self.half_ripe + self.ripe
    }
}

/// Accumulates detections from one batch into per-stage aggregates.
///
/// Bucket aggregation is commutative, so the order images and detections
/// arrive in does not affect the result.
#[derive(Debug)]
pub struct DetectionAggregator<'a> {
    catalog: &'a ClassCatalog,
    unripe: ScoreAccumulator,
    half_ripe: ScoreAccumulator,
    ripe: ScoreAccumulator,
    unknown: ScoreAccumulator,
}

impl<'a> DetectionAggregator<'a> {
    pub fn new(catalog: &'a ClassCatalog) -> Self {
        Self {
            catalog,
            unripe: ScoreAccumulator::default(),
            half_ripe: ScoreAccumulator::default(),
            ripe: ScoreAccumulator::default(),
            unknown: ScoreAccumulator::default(),
        }
    }

    /// Route one detection to its stage bucket
    pub fn record(&mut self, detection: &Detection) {
        let accumulator = match self.catalog.stage_for(&detection.label) {
            Some(RipenessStage::Unripe) => &mut self.unripe,
            Some(RipenessStage::HalfRipe) => &mut self.half_ripe,
            Some(RipenessStage::Ripe) => &mut self.ripe,
            None => &mut self.unknown,
        };
        accumulator.record(detection.confidence);
    }

    pub fn record_all<'d, I>(&mut self, detections: I)
    where
        I: IntoIterator<Item = &'d Detection>,
    {
        for detection in detections {
            self.record(detection);
        }
    }

    /// Finish the batch, omitting stages that saw no detections
    pub fn finish(&self) -> StageBreakdown {
        let emit = |acc: &ScoreAccumulator| (acc.count > 0).then(|| acc.aggregate());

        StageBreakdown {
            unripe: emit(&self.unripe),
            half_ripe: emit(&self.half_ripe),
            ripe: emit(&self.ripe),
            unknown: emit(&self.unknown),
        }
    }
}

/// Percentage shares of the three named stages, 2 decimal places
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RipenessPercentages {
    pub unripe: f64,
    #[serde(rename = "half-ripe")]
    pub half_ripe: f64,
    pub ripe: f64,
}

/// Convert stage counts into percentage shares.
///
/// All three shares are 0.0 when the batch had no catalogued detections;
/// otherwise they sum to 100 within rounding slack.
pub fn ripeness_percentages(counts: &StageCounts) -> RipenessPercentages {
    let total = counts.total();
    if total == 0 {
        return RipenessPercentages {
            unripe: 0.0,
            half_ripe: 0.0,
            ripe: 0.0,
        };
    }

    let share = |count: u32| round_to(100.0 * f64::from(count) / f64::from(total), 2);

    RipenessPercentages {
        unripe: share(counts.unripe),
        half_ripe: share(counts.half_ripe),
        ripe: share(counts.ripe),
    }
}

/// Round half away from zero at the given number of decimal places
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
