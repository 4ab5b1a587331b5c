//! Equipment Statistics Analyzer
//!
//! Pure, stateless analytics over a validated [`DatasetSummary`]. Every
//! function here is total: malformed values were already coerced at the
//! ingest boundary, and degenerate inputs yield sentinel results.
//!
//! ## Architecture
//! - `correlation`: Pearson r with qualitative label and p-value (statrs)
//! - `stability`: share of rows within a relative band of the mean
//! - `risk`: per-type and global baseline ratios, severity tiers, health index
//! - `distribution`: row counts and shares per equipment type
//! - `trends`: multi-run average series from backend history
//! - `report`: one-shot bundle of all of the above for a single dataset
//!
//! [`DatasetSummary`]: crate::types::DatasetSummary

pub mod correlation;
pub mod stability;
pub mod risk;
pub mod distribution;
pub mod trends;
pub mod report;

pub use correlation::CorrelationEstimator;
pub use stability::StabilityScorer;
pub use risk::{RiskClassifier, TypeBaseline};
pub use distribution::{TypeDistribution, TypeShare};
pub use trends::{TrendPoint, TrendSeries};
pub use report::AnalysisReport;

/// Arithmetic mean as `sum / count`; 0 for an empty series.
///
/// Boundary ratios are compared strictly, so results must round exactly as
/// `sum / count` does.
pub(crate) fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::mean;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_mean_matches_sum_over_count() {
        let values = [4.5, 4.0, 1.1];
        assert_eq!(mean(values), values.iter().sum::<f64>() / 3.0);
    }
}
