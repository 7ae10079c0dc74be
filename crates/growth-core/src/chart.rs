//! Chart pipeline
//!
//! reference table -> window -> merge -> unit scaling, producing everything
//! a renderer needs to draw one growth chart.

use crate::assessment::{assess_all, AssessmentSummary, BandAssessment};
use crate::config::ChartConfig;
use crate::merge::{CombinedPoint, Observation, SeriesMerger};
use crate::standards;
use crate::visit::{observations, VisitRecord};
use crate::window::{AgeSeries, AxisBounds, DisplayUnit};
use crate::{Metric, Sex};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Renderer input for one metric of one patient
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GrowthChart {
    pub metric: Metric,
    pub sex: Sex,
    pub title: &'static str,
    pub unit: DisplayUnit,
    /// X-axis label, e.g. `Age (Months)`
    pub unit_label: String,
    /// Y-axis label, e.g. `Weight (kg)`
    pub y_label: &'static str,
    /// Key of the patient series in each point
    pub value_key: &'static str,
    /// Selected window, in years
    pub age_limit_years: f64,
    /// Age axis extent, in `unit`
    pub axis: AxisBounds,
    /// Age-ordered points, ages in `unit`
    pub points: Vec<CombinedPoint>,
    /// Ages in years
    pub assessments: Vec<BandAssessment>,
    pub summary: AssessmentSummary,
}

impl GrowthChart {
    /// Build a chart straight from visit records
    pub fn from_visits(
        visits: &[VisitRecord],
        metric: Metric,
        sex: Sex,
        birth_date: Option<NaiveDate>,
        config: &ChartConfig,
    ) -> Self {
        build_chart(&observations(visits, metric, birth_date), metric, sex, config)
    }

    /// Points carrying a patient value
    pub fn patient_points(&self) -> impl Iterator<Item = &CombinedPoint> {
        self.points.iter().filter(|p| p.value.is_some())
    }

    /// No measurement of this metric has been plotted yet
    pub fn has_patient_data(&self) -> bool {
        self.patient_points().next().is_some()
    }
}

/// Run the full pipeline for one metric
pub fn build_chart(observations: &[Observation], metric: Metric, sex: Sex, config: &ChartConfig) -> GrowthChart {
    let table = standards::table(metric, sex);

    let age_limit_years = if config.full_range {
        config.zoom.full_range_max
    } else {
        config.zoom.select(observations)
    };

    let points = SeriesMerger::new(table, metric)
        .with_tolerance(config.match_tolerance_years)
        .with_age_limit(age_limit_years)
        .merge(observations);

    // Visits past the reference range stay on the axis
    let axis_max_years = points.iter().map(|p| p.age).fold(age_limit_years, f64::max);

    let unit = config.unit.unwrap_or_else(|| DisplayUnit::auto_for(age_limit_years));
    let series = AgeSeries::in_years(points).rescale(unit);

    let assessments = assess_all(observations, table, metric);
    let summary = AssessmentSummary::from_assessments(&assessments);

    debug!(
        %metric,
        %sex,
        %unit,
        age_limit_years,
        points = series.points().len(),
        "built growth chart"
    );

    GrowthChart {
        metric,
        sex,
        title: metric.title(),
        unit,
        unit_label: unit.axis_label(),
        y_label: metric.axis_label(),
        value_key: metric.value_key(),
        age_limit_years,
        axis: AxisBounds::from_years(0.0, axis_max_years, unit),
        points: series.into_points(),
        assessments,
        summary,
    }
}
