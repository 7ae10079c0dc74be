//! Band interpolation between reference samples
//!
//! Values between two sampled ages are linearly interpolated. Outside the
//! sampled range the nearest sample is held flat: a growth standard is never
//! extrapolated.

use crate::standards::ReferencePoint;
use crate::Band;
use serde::{Deserialize, Serialize};

/// Interpolated value of one band at `age` (years).
///
/// Returns `None` only for an empty table.
pub fn interpolate(age: f64, table: &[ReferencePoint], band: Band) -> Option<f64> {
    // First index whose age is strictly greater than `age`
    let split = table.partition_point(|p| p.age <= age);
    let lower = split.checked_sub(1).and_then(|i| table.get(i));
    let upper = table.get(split);

    match (lower, upper) {
        (None, None) => None,
        (None, Some(upper)) => Some(upper.band(band)),
        (Some(lower), None) => Some(lower.band(band)),
        (Some(lower), Some(upper)) => {
            let ratio = (age - lower.age) / (upper.age - lower.age);
            let from = lower.band(band);
            Some(from + (upper.band(band) - from) * ratio)
        }
    }
}

/// All five band values at `age`
pub fn interpolate_bands(age: f64, table: &[ReferencePoint]) -> BandValues {
    BandValues {
        sd3neg: interpolate(age, table, Band::Sd3Neg),
        sd2neg: interpolate(age, table, Band::Sd2Neg),
        sd0: interpolate(age, table, Band::Sd0),
        sd2: interpolate(age, table, Band::Sd2),
        sd3: interpolate(age, table, Band::Sd3),
    }
}

/// Band values attached to a combined point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BandValues {
    pub sd3neg: Option<f64>,
    pub sd2neg: Option<f64>,
    pub sd0: Option<f64>,
    pub sd2: Option<f64>,
    pub sd3: Option<f64>,
}

impl BandValues {
    pub fn from_reference(point: &ReferencePoint) -> Self {
        BandValues {
            sd3neg: Some(point.sd3neg),
            sd2neg: Some(point.sd2neg),
            sd0: Some(point.sd0),
            sd2: Some(point.sd2),
            sd3: Some(point.sd3),
        }
    }

    pub fn get(&self, band: Band) -> Option<f64> {
        match band {
            Band::Sd3Neg => self.sd3neg,
            Band::Sd2Neg => self.sd2neg,
            Band::Sd0 => self.sd0,
            Band::Sd2 => self.sd2,
            Band::Sd3 => self.sd3,
        }
    }

    /// Bands lowest first, paired with their values
    pub fn iter(&self) -> impl Iterator<Item = (Band, Option<f64>)> + '_ {
        Band::ALL.iter().map(move |b| (*b, self.get(*b)))
    }

    /// True when every band has a value
    pub fn is_complete(&self) -> bool {
        self.iter().all(|(_, v)| v.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standards::{table, BOYS_WEIGHT_FOR_AGE};
    use crate::{Metric, Sex};

    fn two_point_table() -> Vec<ReferencePoint> {
        vec![
            ReferencePoint::new(0.0, 1.0, 2.0, 8.0, 9.0, 10.0),
            ReferencePoint::new(1.0, 6.0, 7.0, 10.0, 13.0, 14.0),
            ReferencePoint::new(2.0, 8.0, 9.0, 12.0, 15.0, 16.0),
        ]
    }

    #[test]
    fn test_midpoint() {
        let t = two_point_table();
        let value = interpolate(1.5, &t, Band::Sd0).unwrap();
        assert!((value - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_sample_age() {
        let t = two_point_table();
        assert_eq!(interpolate(1.0, &t, Band::Sd0), Some(10.0));
        assert_eq!(interpolate(0.0, &t, Band::Sd3), Some(10.0));
    }

    #[test]
    fn test_boundary_clamp() {
        let t = two_point_table();
        assert_eq!(interpolate(-1.0, &t, Band::Sd0), Some(8.0));
        assert_eq!(interpolate(100.0, &t, Band::Sd0), Some(12.0));
        assert_eq!(interpolate(2.0, &t, Band::Sd2Neg), Some(9.0));
    }

    #[test]
    fn test_left_clamp_when_table_starts_late() {
        let t = vec![
            ReferencePoint::new(1.0, 1.0, 2.0, 3.0, 4.0, 5.0),
            ReferencePoint::new(2.0, 2.0, 3.0, 4.0, 5.0, 6.0),
        ];
        assert_eq!(interpolate(0.25, &t, Band::Sd2), Some(4.0));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(interpolate(1.0, &[], Band::Sd0), None);
        assert!(!interpolate_bands(1.0, &[]).is_complete());
    }

    #[test]
    fn test_interpolate_bands_boys_weight_half_year() {
        let bands = interpolate_bands(0.5, &BOYS_WEIGHT_FOR_AGE);
        assert!(bands.is_complete());
        assert!((bands.sd0.unwrap() - (3.3 + 10.2) / 2.0).abs() < 1e-9);
        assert!((bands.sd3neg.unwrap() - (2.1 + 7.7) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolated_bands_stay_ordered() {
        let t = table(Metric::Height, Sex::Female);
        let mut age = 0.0;
        while age <= 5.0 {
            let values: Vec<f64> = interpolate_bands(age, t).iter().map(|(_, v)| v.unwrap()).collect();
            assert!(values.windows(2).all(|w| w[0] <= w[1]), "unordered at {}", age);
            age += 0.1;
        }
    }
}
