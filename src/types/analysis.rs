//! Analyzer output types: correlation, risk findings and risk summary

use serde::{Deserialize, Serialize, Serializer};

use super::EquipmentRow;

// ============================================================================
// Correlation
// ============================================================================

/// Pearson coefficient, or a sentinel when too few samples exist
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficient {
    /// Fewer than two paired samples
    Insufficient,
    /// r rounded to two decimal places
    Value(f64),
}

impl Coefficient {
    pub fn value(&self) -> Option<f64> {
        match self {
            Coefficient::Insufficient => None,
            Coefficient::Value(v) => Some(*v),
        }
    }
}

impl std::fmt::Display for Coefficient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coefficient::Insufficient => write!(f, "Insuff. Data"),
            Coefficient::Value(v) => write!(f, "{v:.2}"),
        }
    }
}

impl Serialize for Coefficient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Coefficient::Insufficient => serializer.serialize_str("insufficient"),
            Coefficient::Value(v) => serializer.serialize_f64(*v),
        }
    }
}

/// Qualitative strength of a correlation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CorrelationLabel {
    StrongPositive,
    Moderate,
    WeakNeutral,
    Inverse,
    /// Zero-variance series: no relationship can be measured
    Neutral,
    /// Not enough samples
    NotApplicable,
}

impl std::fmt::Display for CorrelationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationLabel::StrongPositive => write!(f, "Strong Positive"),
            CorrelationLabel::Moderate => write!(f, "Moderate"),
            CorrelationLabel::WeakNeutral => write!(f, "Weak/Neutral"),
            CorrelationLabel::Inverse => write!(f, "Inverse"),
            CorrelationLabel::Neutral => write!(f, "Neutral"),
            CorrelationLabel::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// Correlation Estimator output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub coefficient: Coefficient,
    pub label: CorrelationLabel,
    /// Two-tailed p-value (Student's t, n-2 dof); None when it cannot be computed
    pub p_value: Option<f64>,
    /// Number of paired samples used
    pub sample_count: usize,
}

impl CorrelationResult {
    /// Sentinel for fewer than two samples
    pub fn insufficient(sample_count: usize) -> Self {
        Self {
            coefficient: Coefficient::Insufficient,
            label: CorrelationLabel::NotApplicable,
            p_value: None,
            sample_count,
        }
    }

    /// Sentinel for a zero-variance series
    pub fn neutral(sample_count: usize) -> Self {
        Self {
            coefficient: Coefficient::Value(0.0),
            label: CorrelationLabel::Neutral,
            p_value: None,
            sample_count,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self.coefficient, Coefficient::Insufficient)
    }
}

// ============================================================================
// Risk
// ============================================================================

/// Risk tier of one equipment row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskStatus {
    Stable,
    Warning,
    Critical,
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskStatus::Stable => write!(f, "Stable"),
            RiskStatus::Warning => write!(f, "Warning"),
            RiskStatus::Critical => write!(f, "Critical"),
        }
    }
}

/// Why a row was flagged
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskReason {
    #[serde(rename = "Extreme Pressure")]
    ExtremePressure,
    #[serde(rename = "Thermal Overload")]
    ThermalOverload,
    #[serde(rename = "Operating above nominal range")]
    AboveNominal,
    #[serde(rename = "Process optimization required (Low pressure)")]
    LowPressure,
    #[serde(rename = "")]
    None,
}

impl RiskReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskReason::ExtremePressure => "Extreme Pressure",
            RiskReason::ThermalOverload => "Thermal Overload",
            RiskReason::AboveNominal => "Operating above nominal range",
            RiskReason::LowPressure => "Process optimization required (Low pressure)",
            RiskReason::None => "",
        }
    }
}

impl std::fmt::Display for RiskReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four baseline ratios a row is judged by
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineRatios {
    pub pressure_vs_type: f64,
    pub temperature_vs_type: f64,
    pub pressure_vs_global: f64,
    pub temperature_vs_global: f64,
}

impl BaselineRatios {
    pub fn max(&self) -> f64 {
        self.pressure_vs_type
            .max(self.temperature_vs_type)
            .max(self.pressure_vs_global)
            .max(self.temperature_vs_global)
    }

    pub fn any_above(&self, limit: f64) -> bool {
        self.pressure_vs_type > limit
            || self.temperature_vs_type > limit
            || self.pressure_vs_global > limit
            || self.temperature_vs_global > limit
    }

    pub fn pressure_above(&self, limit: f64) -> bool {
        self.pressure_vs_type > limit || self.pressure_vs_global > limit
    }
}

/// An annotated copy of an input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub row: EquipmentRow,
    pub status: RiskStatus,
    /// 0 = Stable, 1 = Warning/low, 2 = Warning/high, 3 = Critical
    pub severity: u8,
    pub reason: RiskReason,
    pub ratios: BaselineRatios,
}

impl RiskFinding {
    pub fn is_stable(&self) -> bool {
        self.status == RiskStatus::Stable
    }
}

/// Risk Classifier output: ranked findings plus aggregate counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Non-stable findings, severity descending
    pub findings: Vec<RiskFinding>,
    pub critical_count: usize,
    /// Warning findings of either severity (1 or 2)
    pub warning_count: usize,
    /// 100 minus a fixed penalty per finding, floored at 0
    pub health_index: u32,
}

impl RiskSummary {
    pub fn total_findings(&self) -> usize {
        self.findings.len()
    }

    pub fn is_nominal(&self) -> bool {
        self.findings.is_empty()
    }
}
