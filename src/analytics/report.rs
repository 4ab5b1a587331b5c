//! Single-dataset analysis report
//!
//! Bundles everything the dashboard shows for one upload: averages,
//! pressure/temperature correlation, thermal stability, risk findings and the
//! type distribution, plus the narrative sentences that accompany them.

use super::{CorrelationEstimator, RiskClassifier, StabilityScorer, TypeDistribution};
use crate::config::AnalyzerConfig;
use crate::types::{
    Averages, CorrelationResult, DatasetSummary, Parameter, RiskStatus, RiskSummary,
};
use serde::Serialize;

/// Analysis of one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub total_equipment: usize,
    pub averages: Averages,
    pub correlation: CorrelationResult,
    pub correlation_insight: String,
    /// Percentage of units inside the thermal stability envelope
    pub stability_percent: u32,
    pub stability_insight: String,
    pub risk: RiskSummary,
    pub distribution: TypeDistribution,
}

impl AnalysisReport {
    /// Run every analyzer over `summary` with the thresholds in `config`.
    pub fn build(summary: &DatasetSummary, config: &AnalyzerConfig) -> Self {
        let correlation = CorrelationEstimator::between(
            &summary.rows,
            Parameter::Pressure,
            Parameter::Temperature,
            &config.correlation,
        );
        let stability_percent =
            StabilityScorer::score_with(&summary.rows, Parameter::Temperature, &config.stability);

        Self {
            total_equipment: summary.rows.len(),
            averages: summary.averages,
            correlation_insight: correlation_insight(summary, &correlation),
            correlation,
            stability_insight: stability_insight(stability_percent, config.stability.tolerance),
            stability_percent,
            risk: RiskClassifier::classify_with(summary, &config.risk),
            distribution: TypeDistribution::for_summary(summary),
        }
    }
}

/// Backend narrative if present, otherwise a sentence built from the coefficient.
fn correlation_insight(summary: &DatasetSummary, correlation: &CorrelationResult) -> String {
    if let Some(text) = &summary.insights.analytics {
        return text.clone();
    }
    if correlation.is_insufficient() {
        return "Add more equipment data to calculate precise parameter relationships.".to_string();
    }
    format!(
        "Statistical relationship coefficient R={} indicates a {} link in this dataset.",
        correlation.coefficient,
        correlation.label.to_string().to_lowercase()
    )
}

fn stability_insight(percent: u32, tolerance: f64) -> String {
    format!(
        "{percent}% of your units are operating within the target thermal stability envelope (±{:.0}% variance).",
        tolerance * 100.0
    )
}

impl std::fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total equipment:   {} units", self.total_equipment)?;
        for p in Parameter::ALL {
            writeln!(f, "Avg {:<13} {:.2} {}", format!("{p}:"), self.averages.value(p), p.unit())?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Correlation (P→T): {} (R={})",
            self.correlation.label, self.correlation.coefficient
        )?;
        if let Some(p) = self.correlation.p_value {
            writeln!(f, "  p-value:         {p:.4}")?;
        }
        writeln!(f, "  {}", self.correlation_insight)?;
        writeln!(f, "Stability:         {}%", self.stability_percent)?;
        writeln!(f, "  {}", self.stability_insight)?;
        writeln!(f)?;

        if !self.distribution.shares.is_empty() {
            writeln!(f, "Type distribution:")?;
            for share in &self.distribution.shares {
                writeln!(
                    f,
                    "  {:<16} {:>4} ({}%)",
                    share.equipment_type, share.count, share.percentage
                )?;
            }
            writeln!(f)?;
        }

        writeln!(
            f,
            "Critical assets: {}  Warnings: {}  Health index: {}%",
            self.risk.critical_count, self.risk.warning_count, self.risk.health_index
        )?;
        if self.risk.is_nominal() {
            return writeln!(f, "System operating within nominal parameters");
        }

        for finding in &self.risk.findings {
            let marker = match finding.status {
                RiskStatus::Critical => "!!",
                RiskStatus::Warning => " !",
                RiskStatus::Stable => "  ",
            };
            writeln!(
                f,
                "{marker} [{}] {} ({}) - {} - {:.2} bar",
                finding.status,
                finding.row.name,
                finding.row.equipment_type,
                finding.reason,
                finding.row.pressure
            )?;
        }
        Ok(())
    }
}
