//! Band Position Assessment
//!
//! Places each measurement between the reference bands interpolated at the
//! child's age, to flag values a clinician should look at.

use crate::interpolation::{interpolate_bands, BandValues};
use crate::merge::Observation;
use crate::standards::ReferencePoint;
use crate::Metric;
use serde::{Deserialize, Serialize};

/// Interval between reference bands a measurement falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandPosition {
    /// Below -3 SD
    BelowMinus3Sd,
    /// Between -3 SD and -2 SD
    Minus3ToMinus2Sd,
    /// Between -2 SD and +2 SD
    WithinNormalRange,
    /// Between +2 SD and +3 SD
    Plus2ToPlus3Sd,
    /// Above +3 SD
    AbovePlus3Sd,
}

impl BandPosition {
    /// Classify `value` against complete band values
    pub fn classify(value: f64, bands: &BandValues) -> Option<Self> {
        let sd3neg = bands.sd3neg?;
        let sd2neg = bands.sd2neg?;
        let sd2 = bands.sd2?;
        let sd3 = bands.sd3?;

        let position = if value < sd3neg {
            BandPosition::BelowMinus3Sd
        } else if value < sd2neg {
            BandPosition::Minus3ToMinus2Sd
        } else if value <= sd2 {
            BandPosition::WithinNormalRange
        } else if value <= sd3 {
            BandPosition::Plus2ToPlus3Sd
        } else {
            BandPosition::AbovePlus3Sd
        };
        Some(position)
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            BandPosition::BelowMinus3Sd => "Below -3 SD - severely below the reference range",
            BandPosition::Minus3ToMinus2Sd => "Between -3 SD and -2 SD - below the reference range",
            BandPosition::WithinNormalRange => "Between -2 SD and +2 SD - within the reference range",
            BandPosition::Plus2ToPlus3Sd => "Between +2 SD and +3 SD - above the reference range",
            BandPosition::AbovePlus3Sd => "Above +3 SD - severely above the reference range",
        }
    }

    /// Outside the -2 SD..+2 SD range
    pub fn needs_review(&self) -> bool {
        !matches!(self, BandPosition::WithinNormalRange)
    }
}

/// Assessment of one plotted measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandAssessment {
    /// Age in years
    pub age: f64,
    pub value: f64,
    pub position: BandPosition,
    /// Reference median at this age
    pub median: f64,
    pub deviation_from_median: f64,
    /// Value lies outside the physiologically plausible range for the metric
    pub implausible: bool,
}

impl BandAssessment {
    /// Assess a plottable observation against `table`
    pub fn assess(observation: &Observation, table: &[ReferencePoint], metric: Metric) -> Option<Self> {
        let value = observation.plottable_value()?;
        let bands = interpolate_bands(observation.age, table);
        let position = BandPosition::classify(value, &bands)?;
        let median = bands.sd0?;
        let (low, high) = metric.plausible_range();

        Some(BandAssessment {
            age: observation.age,
            value,
            position,
            median,
            deviation_from_median: value - median,
            implausible: value < low || value > high,
        })
    }

    pub fn needs_review(&self) -> bool {
        self.implausible || self.position.needs_review()
    }
}

/// Assess every plottable observation, in input order
pub fn assess_all(observations: &[Observation], table: &[ReferencePoint], metric: Metric) -> Vec<BandAssessment> {
    observations
        .iter()
        .filter_map(|o| BandAssessment::assess(o, table, metric))
        .collect()
}

/// Counts over a patient's assessments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub total: usize,
    pub within_normal_range: usize,
    pub needs_review: usize,
    pub implausible: usize,
    /// Most recent position by age
    pub latest: Option<BandPosition>,
}

impl AssessmentSummary {
    pub fn from_assessments(assessments: &[BandAssessment]) -> Self {
        let within_normal_range = assessments
            .iter()
            .filter(|a| a.position == BandPosition::WithinNormalRange)
            .count();

        let latest = assessments
            .iter()
            .max_by(|a, b| a.age.total_cmp(&b.age))
            .map(|a| a.position);

        AssessmentSummary {
            total: assessments.len(),
            within_normal_range,
            needs_review: assessments.iter().filter(|a| a.needs_review()).count(),
            implausible: assessments.iter().filter(|a| a.implausible).count(),
            latest,
        }
    }
}
