//! Chart configuration
//!
//! Every field has a default, so a JSON document only needs the settings it
//! overrides:
//!
//! ```json
//! { "full_range": true, "unit": "months" }
//! ```

use crate::window::{DisplayUnit, ZoomPolicy};
use crate::{GrowthError, MATCH_TOLERANCE_YEARS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Show the whole reference range instead of auto-zooming
    pub full_range: bool,
    /// Age axis unit; `None` picks one from the window
    pub unit: Option<DisplayUnit>,
    /// Age distance (years) under which a visit annotates a reference sample
    pub match_tolerance_years: f64,
    pub zoom: ZoomPolicy,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            full_range: false,
            unit: None,
            match_tolerance_years: MATCH_TOLERANCE_YEARS,
            zoom: ZoomPolicy::default(),
        }
    }
}

impl ChartConfig {
    pub fn with_unit(mut self, unit: DisplayUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_full_range(mut self, full_range: bool) -> Self {
        self.full_range = full_range;
        self
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, GrowthError> {
        let config: ChartConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GrowthError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), GrowthError> {
        positive("match_tolerance_years", self.match_tolerance_years)?;
        positive("zoom.full_range_max", self.zoom.full_range_max)?;

        if !self.zoom.padding_years.is_finite() || self.zoom.padding_years < 0.0 {
            return Err(GrowthError::InvalidConfig {
                field: "zoom.padding_years",
                value: self.zoom.padding_years,
                reason: "must be a finite, non-negative number of years".to_string(),
            });
        }

        for step in &self.zoom.steps {
            positive("zoom.steps.below_age", step.below_age)?;
            positive("zoom.steps.limit", step.limit)?;
            if step.limit < step.below_age {
                return Err(GrowthError::InvalidConfig {
                    field: "zoom.steps.limit",
                    value: step.limit,
                    reason: format!("window would hide patients up to {} years", step.below_age),
                });
            }
        }

        if let Some(pair) = self.zoom.steps.windows(2).find(|w| w[0].below_age >= w[1].below_age) {
            return Err(GrowthError::InvalidConfig {
                field: "zoom.steps.below_age",
                value: pair[1].below_age,
                reason: "steps must be ordered by increasing age".to_string(),
            });
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), GrowthError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GrowthError::InvalidConfig {
            field,
            value,
            reason: "must be a finite, positive number".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::ZoomStep;

    #[test]
    fn test_default_is_valid() {
        assert!(ChartConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ChartConfig::from_json_str(r#"{ "full_range": true, "unit": "days" }"#).unwrap();

        assert!(config.full_range);
        assert_eq!(config.unit, Some(DisplayUnit::Days));
        assert_eq!(config.match_tolerance_years, MATCH_TOLERANCE_YEARS);
        assert_eq!(config.zoom, ZoomPolicy::default());
    }

    #[test]
    fn test_unknown_unit_rejected() {
        assert!(matches!(
            ChartConfig::from_json_str(r#"{ "unit": "weeks" }"#),
            Err(GrowthError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_tolerance() {
        let config = ChartConfig {
            match_tolerance_years: 0.0,
            ..ChartConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GrowthError::InvalidConfig { field: "match_tolerance_years", .. })
        ));
    }

    #[test]
    fn test_unordered_steps() {
        let mut config = ChartConfig::default();
        config.zoom.steps = vec![
            ZoomStep { below_age: 1.0, limit: 1.2 },
            ZoomStep { below_age: 0.25, limit: 0.5 },
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_step_limit_below_age() {
        let mut config = ChartConfig::default();
        config.zoom.steps = vec![ZoomStep { below_age: 1.0, limit: 0.5 }];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ChartConfig::from_path("/nonexistent/growth-chart.json"),
            Err(GrowthError::Io(_))
        ));
    }
}
