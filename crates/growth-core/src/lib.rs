//! Growth Core - Pediatric Growth Chart Engine
//!
//! Pure Rust engine that shapes a child's clinical measurements and the WHO
//! growth standards into one age-ordered series a chart renderer can draw.
//!
//! # Features
//!
//! - Compiled-in z-score reference tables (weight, height, head circumference)
//! - Linear band interpolation with boundary clamping
//! - Merging of patient observations into the reference series
//! - Auto-zoom age window and years/months/days axis scaling
//! - Band position assessment for each measurement
//!
//! # Example
//!
//! ```rust
//! use growth_core::{build_chart, ChartConfig, Metric, Observation, Sex};
//!
//! let observations = vec![
//!     Observation::new(0.0, Some(3.3)),
//!     Observation::new(0.5, Some(7.0)),
//! ];
//!
//! let chart = build_chart(&observations, Metric::Weight, Sex::Male, &ChartConfig::default());
//! assert_eq!(chart.value_key, "patientWeight");
//! assert!(chart.points.iter().any(|p| p.value == Some(7.0)));
//! ```

pub mod assessment;
pub mod chart;
pub mod config;
pub mod interpolation;
pub mod merge;
pub mod standards;
pub mod visit;
pub mod window;

// Re-export commonly used types for convenience
pub use assessment::{AssessmentSummary, BandAssessment, BandPosition};
pub use chart::{build_chart, GrowthChart};
pub use config::ChartConfig;
pub use interpolation::{interpolate, interpolate_bands, BandValues};
pub use merge::{merge, merge_windowed, CombinedPoint, Observation, SeriesMerger};
pub use standards::{table, ReferencePoint};
pub use visit::{parse_visits, VisitRecord};
pub use window::{rescale, select_window, AgeSeries, AxisBounds, DisplayUnit, ZoomPolicy};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Oldest age covered by the reference tables, in years
pub const FULL_RANGE_MAX_YEARS: f64 = 5.0;

/// Ages closer than this to a reference sample annotate that sample
pub const MATCH_TOLERANCE_YEARS: f64 = 1e-4;

/// Patient sex, as carried on the patient record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    /// Wire name used by the patient record
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = GrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "boy" | "boys" => Ok(Sex::Male),
            "female" | "f" | "girl" | "girls" => Ok(Sex::Female),
            _ => Err(GrowthError::UnknownSex(s.to_string())),
        }
    }
}

/// Measured quantity plotted against age
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Weight,
    Height,
    HeadCircumference,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Weight, Metric::Height, Metric::HeadCircumference];

    /// Key under which the patient's value appears in a combined point
    pub fn value_key(&self) -> &'static str {
        match self {
            Metric::Weight => "patientWeight",
            Metric::Height => "patientHeight",
            Metric::HeadCircumference => "patientHeadCircumference",
        }
    }

    /// Measurement unit of the raw values
    pub fn measurement_unit(&self) -> &'static str {
        match self {
            Metric::Weight => "kg",
            Metric::Height | Metric::HeadCircumference => "cm",
        }
    }

    /// Y-axis label for the chart
    pub fn axis_label(&self) -> &'static str {
        match self {
            Metric::Weight => "Weight (kg)",
            Metric::Height => "Height (cm)",
            Metric::HeadCircumference => "Head circumference (cm)",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::Weight => "Weight-for-Age",
            Metric::Height => "Height-for-Age",
            Metric::HeadCircumference => "Head-Circumference-for-Age",
        }
    }

    /// Physiologically plausible range for a pediatric measurement
    pub fn plausible_range(&self) -> (f64, f64) {
        match self {
            Metric::Weight => (0.3, 150.0),
            Metric::Height => (30.0, 220.0),
            Metric::HeadCircumference => (20.0, 70.0),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Weight => "weight",
            Metric::Height => "height",
            Metric::HeadCircumference => "head_circumference",
        };
        f.write_str(name)
    }
}

impl FromStr for Metric {
    type Err = GrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "weight" | "wt" => Ok(Metric::Weight),
            "height" | "length" | "ht" => Ok(Metric::Height),
            "head" | "head_circumference" | "hc" | "ofc" => Ok(Metric::HeadCircumference),
            _ => Err(GrowthError::UnknownMetric(s.to_string())),
        }
    }
}

/// One of the five z-score reference bands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Sd3Neg,
    Sd2Neg,
    Sd0,
    Sd2,
    Sd3,
}

impl Band {
    /// All bands, lowest first
    pub const ALL: [Band; 5] = [Band::Sd3Neg, Band::Sd2Neg, Band::Sd0, Band::Sd2, Band::Sd3];

    /// Field name of the band in reference and combined points
    pub fn key(&self) -> &'static str {
        match self {
            Band::Sd3Neg => "sd3neg",
            Band::Sd2Neg => "sd2neg",
            Band::Sd0 => "sd0",
            Band::Sd2 => "sd2",
            Band::Sd3 => "sd3",
        }
    }

    /// Legend label
    pub fn label(&self) -> &'static str {
        match self {
            Band::Sd3Neg => "-3 SD",
            Band::Sd2Neg => "-2 SD",
            Band::Sd0 => "Median",
            Band::Sd2 => "+2 SD",
            Band::Sd3 => "+3 SD",
        }
    }

    pub fn z_score(&self) -> f64 {
        match self {
            Band::Sd3Neg => -3.0,
            Band::Sd2Neg => -2.0,
            Band::Sd0 => 0.0,
            Band::Sd2 => 2.0,
            Band::Sd3 => 3.0,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Band {
    type Err = GrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sd3neg" | "-3" | "-3sd" => Ok(Band::Sd3Neg),
            "sd2neg" | "-2" | "-2sd" => Ok(Band::Sd2Neg),
            "sd0" | "0" | "median" => Ok(Band::Sd0),
            "sd2" | "+2" | "2" | "+2sd" => Ok(Band::Sd2),
            "sd3" | "+3" | "3" | "+3sd" => Ok(Band::Sd3),
            _ => Err(GrowthError::UnknownBand(s.to_string())),
        }
    }
}

/// Errors raised at the engine's input boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrowthError {
    /// Metric key outside weight/height/head circumference
    #[error("Unknown metric: '{0}' (expected weight, height or head_circumference)")]
    UnknownMetric(String),
    /// Sex key outside Male/Female
    #[error("Unknown sex: '{0}' (expected Male or Female)")]
    UnknownSex(String),
    /// Display unit outside years/months/days
    #[error("Unknown display unit: '{0}' (expected years, months or days)")]
    UnknownUnit(String),
    /// Band name outside sd3neg..sd3
    #[error("Unknown band: '{0}' (expected sd3neg, sd2neg, sd0, sd2 or sd3)")]
    UnknownBand(String),
    /// Configuration value out of range
    #[error("Invalid configuration {field} = {value}: {reason}")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: String,
    },
    /// Visit or configuration document could not be parsed
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Reading an input file failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for GrowthError {
    fn from(err: serde_json::Error) -> Self {
        GrowthError::InvalidInput(err.to_string())
    }
}

impl From<std::io::Error> for GrowthError {
    fn from(err: std::io::Error) -> Self {
        GrowthError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_parsing() {
        assert_eq!("Male".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!(" girls ".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!(
            "other".parse::<Sex>(),
            Err(GrowthError::UnknownSex("other".to_string()))
        );
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("weight".parse::<Metric>().unwrap(), Metric::Weight);
        assert_eq!("Length".parse::<Metric>().unwrap(), Metric::Height);
        assert_eq!("head-circumference".parse::<Metric>().unwrap(), Metric::HeadCircumference);
        assert!("bmi".parse::<Metric>().is_err());
    }

    #[test]
    fn test_band_parsing_and_order() {
        assert_eq!("median".parse::<Band>().unwrap(), Band::Sd0);
        assert_eq!("sd3neg".parse::<Band>().unwrap(), Band::Sd3Neg);
        assert!("sd1".parse::<Band>().is_err());

        let z: Vec<f64> = Band::ALL.iter().map(|b| b.z_score()).collect();
        assert!(z.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), "\"Female\"");
        assert_eq!(serde_json::to_string(&Band::Sd2Neg).unwrap(), "\"sd2neg\"");
        assert_eq!(
            serde_json::to_string(&Metric::HeadCircumference).unwrap(),
            "\"head_circumference\""
        );
    }

    #[test]
    fn test_error_display() {
        let err = GrowthError::UnknownUnit("weeks".to_string());
        assert!(err.to_string().contains("weeks"));
    }
}
