//! Visible age window and display units
//!
//! The window keeps a two-month-old's chart from spanning five years of
//! reference curve. Units only scale the age axis for presentation; all
//! interpolation happens in years.

use crate::merge::{CombinedPoint, Observation};
use crate::{GrowthError, FULL_RANGE_MAX_YEARS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Unit of the age axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    Years,
    Months,
    Days,
}

impl DisplayUnit {
    /// Display units per year
    pub fn factor(&self) -> f64 {
        match self {
            DisplayUnit::Years => 1.0,
            DisplayUnit::Months => 12.0,
            DisplayUnit::Days => 365.25,
        }
    }

    pub fn from_years(&self, years: f64) -> f64 {
        years * self.factor()
    }

    pub fn to_years(&self, value: f64) -> f64 {
        value / self.factor()
    }

    pub fn label(&self) -> &'static str {
        match self {
            DisplayUnit::Years => "Years",
            DisplayUnit::Months => "Months",
            DisplayUnit::Days => "Days",
        }
    }

    /// X-axis label, e.g. `Age (Months)`
    pub fn axis_label(&self) -> String {
        format!("Age ({})", self.label())
    }

    /// Unit picked when the caller does not request one
    pub fn auto_for(limit_years: f64) -> Self {
        if limit_years <= 2.5 {
            DisplayUnit::Months
        } else {
            DisplayUnit::Years
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

impl FromStr for DisplayUnit {
    type Err = GrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "years" | "year" | "yrs" | "y" => Ok(DisplayUnit::Years),
            "months" | "month" | "mo" | "m" => Ok(DisplayUnit::Months),
            "days" | "day" | "d" => Ok(DisplayUnit::Days),
            _ => Err(GrowthError::UnknownUnit(s.to_string())),
        }
    }
}

/// Auto-zoom step: patients younger than `below_age` get a `limit`-year window
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomStep {
    pub below_age: f64,
    pub limit: f64,
}

/// Policy choosing the visible age window
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomPolicy {
    /// Steps checked in order; the first whose `below_age` exceeds the oldest observation wins
    pub steps: Vec<ZoomStep>,
    /// Years shown past the oldest observation once no step applies
    pub padding_years: f64,
    /// Widest window, the extent of the reference tables
    pub full_range_max: f64,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        ZoomPolicy {
            steps: vec![
                ZoomStep { below_age: 0.25, limit: 0.5 },
                ZoomStep { below_age: 1.0, limit: 1.2 },
                ZoomStep { below_age: 2.0, limit: 2.5 },
            ],
            padding_years: 1.0,
            full_range_max: FULL_RANGE_MAX_YEARS,
        }
    }
}

impl ZoomPolicy {
    /// Window limit (years) for a patient whose oldest observation is `max_age`
    pub fn limit_for(&self, max_age: Option<f64>) -> f64 {
        let Some(max_age) = max_age else {
            return self.full_range_max;
        };
        self.steps
            .iter()
            .find(|step| max_age < step.below_age)
            .map(|step| step.limit)
            .unwrap_or_else(|| self.full_range_max.min(max_age + self.padding_years))
    }

    /// Window limit for a set of observations.
    ///
    /// Only observations with a plottable value count towards the oldest age.
    pub fn select(&self, observations: &[Observation]) -> f64 {
        let max_age = observations
            .iter()
            .filter(|o| o.is_plottable())
            .map(|o| o.age)
            .reduce(f64::max);
        let limit = self.limit_for(max_age);
        debug!(?max_age, limit, "selected age window");
        limit
    }
}

/// Window limit under the default zoom policy
pub fn select_window(observations: &[Observation]) -> f64 {
    ZoomPolicy::default().select(observations)
}

/// Merged points together with the unit their ages are expressed in
#[derive(Clone, Debug, PartialEq)]
pub struct AgeSeries {
    unit: DisplayUnit,
    points: Vec<CombinedPoint>,
}

impl AgeSeries {
    /// Wrap merger output, whose ages are in years
    pub fn in_years(points: Vec<CombinedPoint>) -> Self {
        AgeSeries {
            unit: DisplayUnit::Years,
            points,
        }
    }

    pub fn unit(&self) -> DisplayUnit {
        self.unit
    }

    pub fn points(&self) -> &[CombinedPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<CombinedPoint> {
        self.points
    }

    /// Same series with ages expressed in `unit`
    pub fn rescale(&self, unit: DisplayUnit) -> AgeSeries {
        let ratio = unit.factor() / self.unit.factor();
        let points = self
            .points
            .iter()
            .map(|p| CombinedPoint {
                age: p.age * ratio,
                ..p.clone()
            })
            .collect();
        AgeSeries { unit, points }
    }
}

/// Rescale a series' age axis to `unit`; bands and values are untouched
pub fn rescale(series: &AgeSeries, unit: DisplayUnit) -> AgeSeries {
    series.rescale(unit)
}

/// Age axis extent, in display units
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub fn from_years(min: f64, max: f64, unit: DisplayUnit) -> Self {
        AxisBounds {
            min: unit.from_years(min),
            max: unit.from_years(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
