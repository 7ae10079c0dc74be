//! Series merging
//!
//! Builds one age-ordered series from a reference table and a patient's
//! observations of a single metric. Reference samples are copied as-is; an
//! observation landing on a reference age annotates that sample, any other
//! observation becomes a new point carrying bands interpolated at its age.
//!
//! Only reference-derived points are candidates for the age match, so two
//! visits close in age always stay two distinct points.

use crate::interpolation::{interpolate_bands, BandValues};
use crate::standards::{self, ReferencePoint};
use crate::{Band, Metric, MATCH_TOLERANCE_YEARS};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, trace};

/// One measurement of one patient at one age
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Age in years
    pub age: f64,
    /// Measured value, `None` when the visit did not record it
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(age: f64, value: Option<f64>) -> Self {
        Observation { age, value }
    }

    /// Value to plot, if the observation has a finite age and value
    pub fn plottable_value(&self) -> Option<f64> {
        if !self.age.is_finite() {
            return None;
        }
        self.value.filter(|v| v.is_finite())
    }

    pub fn is_plottable(&self) -> bool {
        self.plottable_value().is_some()
    }
}

/// Where a combined point came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointSource {
    /// Copied from a reference sample
    Reference,
    /// Added for an observation between reference samples
    Observation,
}

/// One point of the merged series.
///
/// Serializes as a flat object: `age`, the five band keys and the metric's
/// value key, with absent values as `null`.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedPoint {
    pub age: f64,
    pub bands: BandValues,
    pub value: Option<f64>,
    pub metric: Metric,
    pub source: PointSource,
}

impl CombinedPoint {
    pub fn from_reference(point: &ReferencePoint, metric: Metric) -> Self {
        CombinedPoint {
            age: point.age,
            bands: BandValues::from_reference(point),
            value: None,
            metric,
            source: PointSource::Reference,
        }
    }

    /// Point for an observation, with bands interpolated from `table`
    pub fn interpolated(age: f64, value: f64, table: &[ReferencePoint], metric: Metric) -> Self {
        CombinedPoint {
            age,
            bands: interpolate_bands(age, table),
            value: Some(value),
            metric,
            source: PointSource::Observation,
        }
    }

    pub fn band(&self, band: Band) -> Option<f64> {
        self.bands.get(band)
    }

    pub fn is_reference(&self) -> bool {
        self.source == PointSource::Reference
    }

    /// Reference values highest first, the order a tooltip lists them in
    pub fn bands_descending(&self) -> Vec<(Band, f64)> {
        let mut bands: Vec<(Band, f64)> = self
            .bands
            .iter()
            .filter_map(|(band, value)| value.map(|v| (band, v)))
            .collect();
        bands.sort_by(|a, b| b.1.total_cmp(&a.1));
        bands
    }
}

impl Serialize for CombinedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + Band::ALL.len()))?;
        map.serialize_entry("age", &self.age)?;
        for (band, value) in self.bands.iter() {
            map.serialize_entry(band.key(), &value)?;
        }
        map.serialize_entry(self.metric.value_key(), &self.value)?;
        map.end()
    }
}

/// Configurable merge of a reference table with observations
#[derive(Clone, Debug)]
pub struct SeriesMerger<'a> {
    table: &'a [ReferencePoint],
    metric: Metric,
    tolerance: f64,
    age_limit: Option<f64>,
}

impl<'a> SeriesMerger<'a> {
    pub fn new(table: &'a [ReferencePoint], metric: Metric) -> Self {
        SeriesMerger {
            table,
            metric,
            tolerance: MATCH_TOLERANCE_YEARS,
            age_limit: None,
        }
    }

    /// Age distance (years) under which an observation annotates a reference sample
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Only materialize reference samples at or below `limit` years.
    ///
    /// Interpolation still uses the whole table.
    pub fn with_age_limit(mut self, limit: f64) -> Self {
        self.age_limit = Some(limit);
        self
    }

    /// Merge `observations` (in input order) into the reference series
    pub fn merge(&self, observations: &[Observation]) -> Vec<CombinedPoint> {
        let reference = match self.age_limit {
            Some(limit) => standards::points_within(self.table, limit),
            None => self.table,
        };

        let mut combined: Vec<CombinedPoint> = reference
            .iter()
            .map(|p| CombinedPoint::from_reference(p, self.metric))
            .collect();
        let reference_len = combined.len();

        for observation in observations {
            let Some(value) = observation.plottable_value() else {
                debug!(age = observation.age, "skipping observation without a plottable value");
                continue;
            };

            let matched = combined[..reference_len]
                .iter_mut()
                .find(|p| (p.age - observation.age).abs() < self.tolerance);

            match matched {
                Some(point) => {
                    trace!(age = point.age, value, "observation annotates reference sample");
                    point.value = Some(value);
                }
                None => combined.push(CombinedPoint::interpolated(
                    observation.age,
                    value,
                    self.table,
                    self.metric,
                )),
            }
        }

        combined.sort_by(|a, b| a.age.total_cmp(&b.age));
        combined
    }
}

/// Merge observations into the full reference table
pub fn merge(table: &[ReferencePoint], observations: &[Observation], metric: Metric) -> Vec<CombinedPoint> {
    SeriesMerger::new(table, metric).merge(observations)
}

/// Merge using only reference samples at or below `limit` years
pub fn merge_windowed(
    table: &[ReferencePoint],
    observations: &[Observation],
    metric: Metric,
    limit: f64,
) -> Vec<CombinedPoint> {
    SeriesMerger::new(table, metric).with_age_limit(limit).merge(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standards::{table, BOYS_WEIGHT_FOR_AGE};
    use crate::Sex;
    use proptest::prelude::*;

    #[test]
    fn test_empty_observations_yield_reference_table() {
        let t = table(Metric::Height, Sex::Male);
        let merged = merge(t, &[], Metric::Height);

        assert_eq!(merged.len(), t.len());
        for (point, reference) in merged.iter().zip(t) {
            assert_eq!(point.age, reference.age);
            assert_eq!(point.bands, BandValues::from_reference(reference));
            assert_eq!(point.value, None);
            assert!(point.is_reference());
        }
    }

    #[test]
    fn test_observation_on_reference_age_annotates_sample() {
        let merged = merge(&BOYS_WEIGHT_FOR_AGE, &[Observation::new(0.00005, Some(3.3))], Metric::Weight);

        assert_eq!(merged.len(), BOYS_WEIGHT_FOR_AGE.len());
        assert_eq!(merged[0].age, 0.0);
        assert_eq!(merged[0].value, Some(3.3));
    }

    #[test]
    fn test_observation_just_outside_tolerance_is_new_point() {
        let merged = merge(&BOYS_WEIGHT_FOR_AGE, &[Observation::new(0.0002, Some(3.4))], Metric::Weight);

        assert_eq!(merged.len(), BOYS_WEIGHT_FOR_AGE.len() + 1);
        assert_eq!(merged[0].value, None);
        assert_eq!(merged[1].age, 0.0002);
        assert_eq!(merged[1].source, PointSource::Observation);
    }

    #[test]
    fn test_close_observations_do_not_collide() {
        let observations = [
            Observation::new(0.5003, Some(7.0)),
            Observation::new(0.5004, Some(7.1)),
        ];
        let merged = merge(&BOYS_WEIGHT_FOR_AGE, &observations, Metric::Weight);

        let added: Vec<&CombinedPoint> = merged.iter().filter(|p| !p.is_reference()).collect();
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].value, Some(7.0));
        assert_eq!(added[1].value, Some(7.1));
    }

    #[test]
    fn test_absent_values_are_skipped() {
        let observations = [
            Observation::new(0.5, None),
            Observation::new(0.7, Some(f64::NAN)),
            Observation::new(f64::NAN, Some(8.0)),
            Observation::new(0.9, Some(0.0)),
        ];
        let merged = merge(&BOYS_WEIGHT_FOR_AGE, &observations, Metric::Weight);

        let added: Vec<&CombinedPoint> = merged.iter().filter(|p| !p.is_reference()).collect();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].age, 0.9);
        assert_eq!(added[0].value, Some(0.0));
    }

    #[test]
    fn test_later_observation_on_same_sample_wins() {
        let observations = [Observation::new(1.0, Some(10.0)), Observation::new(1.0, Some(10.4))];
        let merged = merge(&BOYS_WEIGHT_FOR_AGE, &observations, Metric::Weight);

        assert_eq!(merged.len(), BOYS_WEIGHT_FOR_AGE.len());
        assert_eq!(merged[1].value, Some(10.4));
    }

    #[test]
    fn test_windowed_merge_interpolates_against_full_table() {
        let merged = merge_windowed(
            &BOYS_WEIGHT_FOR_AGE,
            &[Observation::new(0.1, Some(4.5))],
            Metric::Weight,
            0.5,
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].age, 0.0);
        let expected = 3.3 + (10.2 - 3.3) * 0.1;
        assert!((merged[1].band(Band::Sd0).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_serialized_shape() {
        let merged = merge(&BOYS_WEIGHT_FOR_AGE, &[Observation::new(0.0, Some(3.3))], Metric::Weight);
        let json = serde_json::to_value(&merged[0]).unwrap();

        assert_eq!(json["age"], 0.0);
        assert_eq!(json["sd0"], 3.3);
        assert_eq!(json["patientWeight"], 3.3);
        assert!(json["sd3neg"].is_number());

        let json = serde_json::to_value(&merged[1]).unwrap();
        assert!(json["patientWeight"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_bands_descending() {
        let point = CombinedPoint::from_reference(&BOYS_WEIGHT_FOR_AGE[1], Metric::Weight);
        let order: Vec<Band> = point.bands_descending().into_iter().map(|(b, _)| b).collect();
        assert_eq!(order, vec![Band::Sd3, Band::Sd2, Band::Sd0, Band::Sd2Neg, Band::Sd3Neg]);
    }

    proptest! {
        #[test]
        fn prop_merge_is_sorted_by_age(
            ages in prop::collection::vec(-1.0f64..8.0, 0..40),
            values in prop::collection::vec(prop::option::of(0.0f64..40.0), 0..40),
        ) {
            let observations: Vec<Observation> = ages
                .iter()
                .zip(values.iter())
                .map(|(age, value)| Observation::new(*age, *value))
                .collect();
            let merged = merge(&BOYS_WEIGHT_FOR_AGE, &observations, Metric::Weight);

            prop_assert!(merged.windows(2).all(|w| w[0].age <= w[1].age));
        }

        #[test]
        fn prop_every_observation_is_represented(
            ages in prop::collection::vec(0.01f64..4.99, 1..30),
        ) {
            let observations: Vec<Observation> = ages
                .iter()
                .enumerate()
                .map(|(i, age)| Observation::new(*age, Some(i as f64)))
                .collect();
            let merged = merge(&BOYS_WEIGHT_FOR_AGE, &observations, Metric::Weight);

            for observation in &observations {
                let found = merged.iter().any(|p| p.age == observation.age && p.value == observation.value);
                let on_sample = BOYS_WEIGHT_FOR_AGE
                    .iter()
                    .any(|r| (r.age - observation.age).abs() < MATCH_TOLERANCE_YEARS);
                prop_assert!(found || on_sample);
            }
        }
    }
}
