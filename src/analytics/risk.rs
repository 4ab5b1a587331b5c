//! Risk Classifier
//!
//! Compares every row against two baselines: the mean of its own equipment
//! type and the backend's global averages. The worst ratio decides the tier.
//!
//! ## Tiers (first match wins)
//! - **Critical** (3): any ratio above the critical limit. Reason is
//!   "Extreme Pressure" if either pressure ratio is above the limit,
//!   otherwise "Thermal Overload". Pressure wins the tie even when a
//!   temperature ratio is the larger one.
//! - **Warning/high** (2): any ratio above the warning limit.
//! - **Warning/low** (1): type-relative pressure ratio below the low limit.
//! - **Stable** (0): excluded from the findings list.

use crate::types::{
    nonzero_or_one,
    risk_thresholds::{
        HEALTH_INDEX_MAX, SEVERITY_CRITICAL, SEVERITY_HIGH_WARNING, SEVERITY_LOW_WARNING,
        SEVERITY_STABLE,
    },
    Averages, BaselineRatios, DatasetSummary, EquipmentRow, RiskFinding, RiskReason, RiskStatus,
    RiskSummary, RiskThresholds,
};
use super::mean;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Per-type mean of each parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeBaseline {
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
    /// Rows of this type
    pub count: usize,
}

/// Outlier and risk classification
pub struct RiskClassifier;

impl RiskClassifier {
    /// Classify a dataset with the default thresholds.
    pub fn classify(summary: &DatasetSummary) -> RiskSummary {
        Self::classify_with(summary, &RiskThresholds::default())
    }

    /// Classify a dataset and aggregate the findings.
    ///
    /// Findings are the non-stable rows, severity descending; rows of equal
    /// severity keep their input order.
    pub fn classify_with(summary: &DatasetSummary, thresholds: &RiskThresholds) -> RiskSummary {
        let baselines = Self::type_baselines(&summary.rows);

        let mut findings: Vec<RiskFinding> = summary
            .rows
            .iter()
            .filter_map(|row| {
                let baseline = baselines.get(&row.equipment_type)?;
                let finding = Self::assess_row(row, baseline, &summary.averages, thresholds);
                (!finding.is_stable()).then_some(finding)
            })
            .collect();

        // Vec::sort_by is stable
        findings.sort_by(|a, b| b.severity.cmp(&a.severity));

        for f in &findings {
            debug!(
                equipment = %f.row.name,
                equipment_type = %f.row.equipment_type,
                status = %f.status,
                severity = f.severity,
                reason = %f.reason,
                "Risk finding"
            );
        }

        let risk = Self::summarize(findings, thresholds);
        info!(
            rows = summary.rows.len(),
            types = baselines.len(),
            critical = risk.critical_count,
            warning = risk.warning_count,
            health_index = risk.health_index,
            "Risk classification complete"
        );
        risk
    }

    /// Mean flowrate, pressure and temperature per equipment type.
    pub fn type_baselines(rows: &[EquipmentRow]) -> BTreeMap<String, TypeBaseline> {
        let mut groups: BTreeMap<&str, Vec<&EquipmentRow>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.equipment_type.as_str()).or_default().push(row);
        }

        groups
            .into_iter()
            .map(|(ty, members)| {
                let baseline = TypeBaseline {
                    flowrate: mean(members.iter().map(|r| r.flowrate)),
                    pressure: mean(members.iter().map(|r| r.pressure)),
                    temperature: mean(members.iter().map(|r| r.temperature)),
                    count: members.len(),
                };
                (ty.to_string(), baseline)
            })
            .collect()
    }

    /// The four baseline ratios of one row.
    ///
    /// Zero baselines are replaced by 1 so a ratio is always defined.
    pub fn ratios(row: &EquipmentRow, baseline: &TypeBaseline, global: &Averages) -> BaselineRatios {
        BaselineRatios {
            pressure_vs_type: row.pressure / nonzero_or_one(baseline.pressure),
            temperature_vs_type: row.temperature / nonzero_or_one(baseline.temperature),
            pressure_vs_global: row.pressure / nonzero_or_one(global.pressure),
            temperature_vs_global: row.temperature / nonzero_or_one(global.temperature),
        }
    }

    /// Classify a single row against its type baseline and the global averages.
    ///
    /// Always returns a finding; stable rows carry severity 0 and no reason.
    pub fn assess_row(
        row: &EquipmentRow,
        baseline: &TypeBaseline,
        global: &Averages,
        thresholds: &RiskThresholds,
    ) -> RiskFinding {
        let ratios = Self::ratios(row, baseline, global);

        let (status, severity, reason) = if ratios.any_above(thresholds.critical_ratio) {
            let reason = if ratios.pressure_above(thresholds.critical_ratio) {
                RiskReason::ExtremePressure
            } else {
                RiskReason::ThermalOverload
            };
            (RiskStatus::Critical, SEVERITY_CRITICAL, reason)
        } else if ratios.any_above(thresholds.warning_ratio) {
            (RiskStatus::Warning, SEVERITY_HIGH_WARNING, RiskReason::AboveNominal)
        } else if ratios.pressure_vs_type < thresholds.low_pressure_ratio {
            (RiskStatus::Warning, SEVERITY_LOW_WARNING, RiskReason::LowPressure)
        } else {
            (RiskStatus::Stable, SEVERITY_STABLE, RiskReason::None)
        };

        RiskFinding {
            row: row.clone(),
            status,
            severity,
            reason,
            ratios,
        }
    }

    /// Aggregate counts and the health index for an already-ranked finding list.
    pub fn summarize(findings: Vec<RiskFinding>, thresholds: &RiskThresholds) -> RiskSummary {
        let critical_count = findings
            .iter()
            .filter(|f| f.status == RiskStatus::Critical)
            .count();
        let warning_count = findings
            .iter()
            .filter(|f| f.status == RiskStatus::Warning)
            .count();

        RiskSummary {
            health_index: Self::health_index(findings.len(), thresholds.health_penalty_per_finding),
            findings,
            critical_count,
            warning_count,
        }
    }

    /// `100 - penalty × findings`, floored at 0 and capped at 100.
    pub fn health_index(findings: usize, penalty: u32) -> u32 {
        let findings = u32::try_from(findings).unwrap_or(u32::MAX);
        HEALTH_INDEX_MAX
            .saturating_sub(penalty.saturating_mul(findings))
            .min(HEALTH_INDEX_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, ty: &str, pressure: f64, temperature: f64) -> EquipmentRow {
        EquipmentRow::new(name, ty, 100.0, pressure, temperature)
    }

    fn summary(rows: Vec<EquipmentRow>, pressure: f64, temperature: f64) -> DatasetSummary {
        DatasetSummary::new(rows, Averages::new(100.0, pressure, temperature))
    }

    #[test]
    fn test_identical_rows_have_no_findings() {
        let s = summary(vec![row("P-1", "Pump", 10.0, 50.0), row("P-2", "Pump", 10.0, 50.0)], 10.0, 50.0);
        let risk = RiskClassifier::classify(&s);
        assert!(risk.is_nominal());
        assert_eq!(risk.health_index, 100);
        assert_eq!(risk.critical_count, 0);
        assert_eq!(risk.warning_count, 0);
    }

    #[test]
    fn test_global_pressure_ratio_triggers_critical() {
        // Type ratio is 1.0 but the global ratio is 2.0
        let s = summary(vec![row("P-1", "Pump", 20.0, 50.0)], 10.0, 50.0);
        let risk = RiskClassifier::classify(&s);
        assert_eq!(risk.findings.len(), 1);
        let f = &risk.findings[0];
        assert_eq!(f.status, RiskStatus::Critical);
        assert_eq!(f.severity, 3);
        assert_eq!(f.reason, RiskReason::ExtremePressure);
        assert!((f.ratios.pressure_vs_type - 1.0).abs() < 1e-12);
        assert!((f.ratios.pressure_vs_global - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_thermal_overload_when_only_temperature_critical() {
        let s = summary(vec![row("H-1", "Heater", 10.0, 160.0)], 10.0, 100.0);
        let risk = RiskClassifier::classify(&s);
        assert_eq!(risk.findings[0].reason, RiskReason::ThermalOverload);
    }

    #[test]
    fn test_pressure_wins_reason_tie_break() {
        // Temperature ratio 3.0 dominates, pressure ratio 1.6 still selects Extreme Pressure
        let s = summary(vec![row("R-1", "Reactor", 16.0, 300.0)], 10.0, 100.0);
        let risk = RiskClassifier::classify(&s);
        let f = &risk.findings[0];
        assert_eq!(f.status, RiskStatus::Critical);
        assert_eq!(f.reason, RiskReason::ExtremePressure);
    }

    #[test]
    fn test_critical_takes_priority_over_warning() {
        let s = summary(vec![row("P-1", "Pump", 13.0, 80.0)], 10.0, 50.0);
        let risk = RiskClassifier::classify(&s);
        let f = &risk.findings[0];
        // pressure ratio 1.3 would be a warning, temperature ratio 1.6 is critical
        assert_eq!(f.severity, 3);
        assert_eq!(f.reason, RiskReason::ThermalOverload);
    }

    #[test]
    fn test_high_warning() {
        let s = summary(vec![row("P-1", "Pump", 13.0, 50.0)], 10.0, 50.0);
        let risk = RiskClassifier::classify(&s);
        let f = &risk.findings[0];
        assert_eq!(f.status, RiskStatus::Warning);
        assert_eq!(f.severity, 2);
        assert_eq!(f.reason, RiskReason::AboveNominal);
    }

    #[test]
    fn test_limits_are_strict() {
        // Exactly 1.5 is not critical, exactly 1.2 is not a warning
        let s = summary(vec![row("P-1", "Pump", 15.0, 50.0)], 10.0, 50.0);
        assert_eq!(RiskClassifier::classify(&s).findings[0].severity, 2);

        let s = summary(vec![row("P-1", "Pump", 12.0, 50.0)], 10.0, 50.0);
        assert!(RiskClassifier::classify(&s).is_nominal());
    }

    #[test]
    fn test_low_pressure_warning() {
        // Pump mean pressure = 10; P-2 at 4 → type ratio 0.4
        let rows = vec![row("P-1", "Pump", 16.0, 50.0), row("P-2", "Pump", 4.0, 50.0)];
        let s = summary(rows, 100.0, 50.0);
        let risk = RiskClassifier::classify(&s);
        let low = risk.findings.iter().find(|f| f.row.name == "P-2").unwrap();
        assert_eq!(low.severity, 1);
        assert_eq!(low.reason, RiskReason::LowPressure);
    }

    #[test]
    fn test_low_pressure_boundary_is_stable() {
        // Valve mean = 12; V-1 at 6 → ratio exactly 0.5
        let rows = vec![row("V-1", "Valve", 6.0, 50.0), row("V-2", "Valve", 18.0, 50.0)];
        let s = summary(rows, 12.0, 50.0);
        let risk = RiskClassifier::classify(&s);
        assert!(risk.findings.iter().all(|f| f.row.name != "V-1"));
    }

    #[test]
    fn test_zero_averages_treated_as_one() {
        let rows = vec![row("Z-1", "Pump", 0.0, 0.0), row("Z-2", "Pump", 0.0, 0.0)];
        let s = summary(rows, 0.0, 0.0);
        let risk = RiskClassifier::classify(&s);
        // every ratio is 0/1 = 0 → only the low-pressure rule can fire
        assert_eq!(risk.findings.len(), 2);
        assert!(risk.findings.iter().all(|f| f.severity == 1));
        assert!(risk.findings.iter().all(|f| f.ratios.max() == 0.0));
    }

    #[test]
    fn test_sorted_by_severity_descending_and_stable() {
        let rows = vec![
            row("W-1", "Pump", 13.0, 50.0),
            row("C-1", "Pump", 30.0, 50.0),
            row("W-2", "Pump", 13.0, 50.0),
            row("C-2", "Pump", 30.0, 50.0),
        ];
        // Pump mean pressure = 21.5, globals make the 13s a warning and 30s critical
        let s = summary(rows, 10.0, 50.0);
        let risk = RiskClassifier::classify(&s);
        let names: Vec<&str> = risk.findings.iter().map(|f| f.row.name.as_str()).collect();
        assert_eq!(names, vec!["C-1", "C-2", "W-1", "W-2"]);
        assert!(risk.findings.windows(2).all(|w| w[0].severity >= w[1].severity));
        assert_eq!(risk.critical_count, 2);
        assert_eq!(risk.warning_count, 2);
        assert_eq!(risk.health_index, 80);
    }

    #[test]
    fn test_type_baselines() {
        let rows = vec![
            row("P-1", "Pump", 10.0, 40.0),
            row("P-2", "Pump", 20.0, 60.0),
            row("V-1", "Valve", 5.0, 30.0),
        ];
        let baselines = RiskClassifier::type_baselines(&rows);
        assert_eq!(baselines.len(), 2);
        let pump = baselines["Pump"];
        assert_eq!(pump.count, 2);
        assert!((pump.pressure - 15.0).abs() < 1e-12);
        assert!((pump.temperature - 50.0).abs() < 1e-12);
        assert!((baselines["Valve"].pressure - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_type_baseline_is_sum_over_count() {
        let rows = vec![
            row("P-1", "Pump", 2.1, 50.0),
            row("P-2", "Pump", 8.7, 50.0),
            row("P-3", "Pump", 3.3, 50.0),
            row("P-4", "Pump", 9.1, 50.0),
        ];
        let baselines = RiskClassifier::type_baselines(&rows);
        assert_eq!(baselines["Pump"].pressure, (2.1 + 8.7 + 3.3 + 9.1) / 4.0);

        // 8.7 / 5.799999999999999 lands just above 1.5
        let s = summary(rows, 100.0, 50.0);
        let risk = RiskClassifier::classify(&s);
        let p2 = risk
            .findings
            .iter()
            .find(|f| f.row.name == "P-2")
            .unwrap();
        assert!(p2.ratios.pressure_vs_type > 1.5);
        assert_eq!(p2.status, RiskStatus::Critical);
        assert_eq!(p2.reason, RiskReason::ExtremePressure);
    }

    #[test]
    fn test_health_index_floor_and_cap() {
        assert_eq!(RiskClassifier::health_index(0, 5), 100);
        assert_eq!(RiskClassifier::health_index(3, 5), 85);
        assert_eq!(RiskClassifier::health_index(20, 5), 0);
        assert_eq!(RiskClassifier::health_index(400, 5), 0);
        assert_eq!(RiskClassifier::health_index(usize::MAX, 5), 0);
    }

    #[test]
    fn test_input_rows_not_mutated() {
        let s = summary(vec![row("P-1", "Pump", 20.0, 50.0)], 10.0, 50.0);
        let before = s.clone();
        let risk = RiskClassifier::classify(&s);
        assert_eq!(s, before);
        assert_eq!(risk.findings[0].row, before.rows[0]);
    }

    #[test]
    fn test_custom_thresholds() {
        let s = summary(vec![row("P-1", "Pump", 20.0, 50.0)], 10.0, 50.0);
        let lenient = RiskThresholds {
            critical_ratio: 2.5,
            warning_ratio: 2.2,
            ..RiskThresholds::default()
        };
        assert!(RiskClassifier::classify_with(&s, &lenient).is_nominal());
    }
}
