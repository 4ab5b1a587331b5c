//! Stability Scorer
//!
//! Percentage of rows whose parameter sits inside a relative band around the
//! population mean. The band is exclusive: a row exactly at the tolerance is
//! outside it.

use crate::types::{
    stability_thresholds::VACUOUS_PERCENT, EquipmentRow, Parameter, StabilityThresholds,
};
use super::mean;

/// Stability envelope scoring
pub struct StabilityScorer;

impl StabilityScorer {
    /// Percentage (0-100) of rows within the default ±25% envelope.
    pub fn score(rows: &[EquipmentRow], parameter: Parameter) -> u32 {
        Self::score_with(rows, parameter, &StabilityThresholds::default())
    }

    pub fn score_with(
        rows: &[EquipmentRow],
        parameter: Parameter,
        thresholds: &StabilityThresholds,
    ) -> u32 {
        let values: Vec<f64> = rows.iter().map(|r| r.value(parameter)).collect();
        Self::score_values(&values, thresholds.tolerance)
    }

    /// Score a raw series.
    ///
    /// - Empty input is vacuously stable (100)
    /// - A zero mean counts every value as within bounds
    /// - Deviation is `|v - mean| / mean`, compared with `<`
    pub fn score_values(values: &[f64], tolerance: f64) -> u32 {
        if values.is_empty() {
            return VACUOUS_PERCENT;
        }

        let avg = mean(values.iter().copied());
        let within = values
            .iter()
            .filter(|&&v| Self::within_bounds(v, avg, tolerance))
            .count();

        let percent = within as f64 / values.len() as f64 * 100.0;
        percent.round() as u32
    }

    fn within_bounds(value: f64, mean: f64, tolerance: f64) -> bool {
        if mean == 0.0 {
            return true;
        }
        // Signed mean: a negative mean yields a negative deviation, which is always inside
        (value - mean).abs() / mean < tolerance
    }
}
