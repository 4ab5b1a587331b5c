//! Correlation Estimator
//!
//! Pearson correlation between two parameter series, labelled by strength.
//! A two-tailed p-value from Student's t-distribution (statrs) is attached
//! when enough samples exist, but the label depends on r alone.

use crate::types::{
    correlation_thresholds::{MIN_SAMPLES, MIN_SAMPLES_FOR_P_VALUE},
    Coefficient, CorrelationBands, CorrelationLabel, CorrelationResult, EquipmentRow, Parameter,
};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Correlation analysis over paired parameter series
pub struct CorrelationEstimator;

impl CorrelationEstimator {
    /// Correlate `x` (independent) with `y` (dependent) using default bands.
    pub fn estimate(x: &[f64], y: &[f64]) -> CorrelationResult {
        Self::estimate_with(x, y, &CorrelationBands::default())
    }

    /// Correlate `x` with `y`, labelling with the given bands.
    ///
    /// Series of unequal length are paired up to the shorter one.
    ///
    /// # Returns
    /// - `Insufficient` / `NotApplicable` when fewer than two pairs exist
    /// - `0` / `Neutral` when either series has zero variance
    /// - otherwise r rounded to two decimals, labelled from the unrounded r
    pub fn estimate_with(x: &[f64], y: &[f64], bands: &CorrelationBands) -> CorrelationResult {
        let n = x.len().min(y.len());
        if n < MIN_SAMPLES {
            return CorrelationResult::insufficient(n);
        }
        let (x, y) = (&x[..n], &y[..n]);

        let Some(r) = Self::pearson(x, y) else {
            return CorrelationResult::neutral(n);
        };

        let p_value = (n >= MIN_SAMPLES_FOR_P_VALUE).then(|| Self::p_value_for_r(r, n));

        CorrelationResult {
            coefficient: Coefficient::Value(round2(r)),
            label: Self::classify(r, bands),
            p_value,
            sample_count: n,
        }
    }

    /// Correlate two parameters across a set of rows.
    pub fn between(
        rows: &[EquipmentRow],
        x: Parameter,
        y: Parameter,
        bands: &CorrelationBands,
    ) -> CorrelationResult {
        let xs: Vec<f64> = rows.iter().map(|r| r.value(x)).collect();
        let ys: Vec<f64> = rows.iter().map(|r| r.value(y)).collect();
        Self::estimate_with(&xs, &ys, bands)
    }

    /// Pressure (independent) against temperature (dependent), the dashboard pairing.
    pub fn pressure_temperature(rows: &[EquipmentRow]) -> CorrelationResult {
        Self::between(
            rows,
            Parameter::Pressure,
            Parameter::Temperature,
            &CorrelationBands::default(),
        )
    }

    /// Label a coefficient: strictly above `strong`, `moderate`, `inverse` in turn.
    pub fn classify(r: f64, bands: &CorrelationBands) -> CorrelationLabel {
        if r > bands.strong {
            CorrelationLabel::StrongPositive
        } else if r > bands.moderate {
            CorrelationLabel::Moderate
        } else if r > bands.inverse {
            CorrelationLabel::WeakNeutral
        } else {
            CorrelationLabel::Inverse
        }
    }

    /// Sum-form Pearson coefficient
    ///
    /// Formula: r = (nΣxy − ΣxΣy) / sqrt((nΣx² − (Σx)²)(nΣy² − (Σy)²))
    ///
    /// Returns None when the denominator vanishes (a constant series).
    fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
        // Rounding can leave a constant series with a tiny non-zero variance term
        if is_constant(x) || is_constant(y) {
            return None;
        }

        let n = x.len() as f64;
        let sum_x: f64 = x.iter().sum();
        let sum_y: f64 = y.iter().sum();
        let sum_xy: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
        let sum_x2: f64 = x.iter().map(|a| a * a).sum();
        let sum_y2: f64 = y.iter().map(|a| a * a).sum();

        let numerator = n * sum_xy - sum_x * sum_y;
        let denominator = ((n * sum_x2 - sum_x.powi(2)) * (n * sum_y2 - sum_y.powi(2))).sqrt();

        if denominator == 0.0 || !denominator.is_finite() {
            None
        } else {
            Some((numerator / denominator).clamp(-1.0, 1.0))
        }
    }

    /// Two-tailed p-value for r over n ≥ 3 samples (t with n-2 dof).
    fn p_value_for_r(r: f64, n: usize) -> f64 {
        if r.abs() >= 0.9999 {
            return 0.0;
        }

        let df = (n - 2) as f64;
        let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();

        match StudentsT::new(0.0, 1.0, df) {
            Ok(t_dist) => (2.0 * (1.0 - t_dist.cdf(t_stat.abs()))).clamp(0.0, 1.0),
            Err(_) => 1.0,
        }
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
