//! Visit records as delivered by the patient record API
//!
//! Measurement fields are parsed leniently: numbers and numeric strings are
//! accepted, while `null`, missing fields, empty strings and anything
//! non-numeric become `None`. A missing measurement is never read as zero.

use crate::merge::Observation;
use crate::{GrowthError, Metric};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Average days per year used to turn date differences into ages
pub const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Age in years at the visit
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    /// kg
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    /// cm
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    /// cm
    #[serde(default, deserialize_with = "lenient_number")]
    pub head_circumference: Option<f64>,
}

impl VisitRecord {
    pub fn measurement(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Weight => self.weight,
            Metric::Height => self.height,
            Metric::HeadCircumference => self.head_circumference,
        }
    }

    /// Recorded age, or the age derived from the visit date and `birth_date`
    pub fn resolved_age(&self, birth_date: Option<NaiveDate>) -> Option<f64> {
        if let Some(age) = self.age {
            return Some(age);
        }
        match (self.date, birth_date) {
            (Some(date), Some(dob)) => Some(age_in_years(dob, date)),
            _ => None,
        }
    }

    /// Observation of `metric` at this visit, if the visit's age is known
    pub fn observation(&self, metric: Metric, birth_date: Option<NaiveDate>) -> Option<Observation> {
        self.resolved_age(birth_date)
            .map(|age| Observation::new(age, self.measurement(metric)))
    }
}

/// Observations of one metric across visits, in visit order.
///
/// Visits without a usable age are dropped; visits without the measurement
/// are kept with an absent value and skipped later by the merger.
pub fn observations(visits: &[VisitRecord], metric: Metric, birth_date: Option<NaiveDate>) -> Vec<Observation> {
    visits
        .iter()
        .filter_map(|visit| {
            let observation = visit.observation(metric, birth_date);
            if observation.is_none() {
                debug!(date = ?visit.date, "dropping visit without a usable age");
            }
            observation
        })
        .collect()
}

/// Parse a JSON array of visit records
pub fn parse_visits(json: &str) -> Result<Vec<VisitRecord>, GrowthError> {
    Ok(serde_json::from_str(json)?)
}

/// Age in years between two calendar dates
pub fn age_in_years(birth_date: NaiveDate, on: NaiveDate) -> f64 {
    (on - birth_date).num_days() as f64 / DAYS_PER_YEAR
}

/// Finite number from a JSON number or numeric string
pub fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(numeric_value))
}

fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| {
            // Accept full timestamps by keeping only the date part
            let day = s.trim().get(..10).unwrap_or(s.trim());
            NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_parsing() {
        let visits = parse_visits(
            r#"[
                {"age": 0.5, "weight": 7.0, "height": "66.1", "head_circumference": null},
                {"age": "1", "weight": "", "height": "n/a"},
                {"age": 1.5, "weight": 0, "diagnosis": "well child", "notes": "ok"}
            ]"#,
        )
        .unwrap();

        assert_eq!(visits.len(), 3);
        assert_eq!(visits[0].weight, Some(7.0));
        assert_eq!(visits[0].height, Some(66.1));
        assert_eq!(visits[0].head_circumference, None);
        assert_eq!(visits[1].age, Some(1.0));
        assert_eq!(visits[1].weight, None);
        assert_eq!(visits[1].height, None);
        assert_eq!(visits[2].weight, Some(0.0));
        assert_eq!(visits[2].height, None);
    }

    #[test]
    fn test_non_array_rejected() {
        assert!(matches!(parse_visits(r#"{"age": 1}"#), Err(GrowthError::InvalidInput(_))));
    }

    #[test]
    fn test_observations_keep_visit_order() {
        let visits = vec![
            VisitRecord { age: Some(1.0), weight: Some(10.0), ..Default::default() },
            VisitRecord { age: Some(0.5), weight: None, ..Default::default() },
            VisitRecord { age: None, weight: Some(12.0), ..Default::default() },
        ];
        let obs = observations(&visits, Metric::Weight, None);

        assert_eq!(obs, vec![Observation::new(1.0, Some(10.0)), Observation::new(0.5, None)]);
    }

    #[test]
    fn test_age_from_dates() {
        let visits = parse_visits(r#"[{"date": "2025-07-02T09:30:00Z", "height": 67.0}]"#).unwrap();
        let dob = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let obs = observations(&visits, Metric::Height, Some(dob));
        assert_eq!(obs.len(), 1);
        assert!((obs[0].age - 182.0 / DAYS_PER_YEAR).abs() < 1e-12);
        assert!(observations(&visits, Metric::Height, None).is_empty());
    }

    #[test]
    fn test_recorded_age_preferred_over_dates() {
        let visit = VisitRecord {
            age: Some(0.25),
            date: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..Default::default()
        };
        let dob = NaiveDate::from_ymd_opt(2025, 1, 1);
        assert_eq!(visit.resolved_age(dob), Some(0.25));
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value(&Value::from(3)), Some(3.0));
        assert_eq!(numeric_value(&Value::from(" 4.5 ")), Some(4.5));
        assert_eq!(numeric_value(&Value::from("NaN")), None);
        assert_eq!(numeric_value(&Value::from("inf")), None);
        assert_eq!(numeric_value(&Value::Bool(true)), None);
    }
}
