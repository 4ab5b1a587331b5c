//! Classification thresholds and their operator-tunable groupings

use serde::{Deserialize, Serialize};

/// Thresholds for risk classification against type and global baselines
pub mod risk_thresholds {
    /// Any baseline ratio above this is critical
    pub const CRITICAL_RATIO: f64 = 1.5;
    /// Any baseline ratio above this (and none critical) is a high warning
    pub const WARNING_RATIO: f64 = 1.2;
    /// Type-relative pressure ratio below this is a low-pressure warning
    pub const LOW_PRESSURE_RATIO: f64 = 0.5;
    /// Health index points deducted per non-stable finding
    pub const HEALTH_PENALTY_PER_FINDING: u32 = 5;
    /// Health index with no findings
    pub const HEALTH_INDEX_MAX: u32 = 100;

    // === Severity tiers ===
    pub const SEVERITY_STABLE: u8 = 0;
    pub const SEVERITY_LOW_WARNING: u8 = 1;
    pub const SEVERITY_HIGH_WARNING: u8 = 2;
    pub const SEVERITY_CRITICAL: u8 = 3;
}

/// Thresholds for the stability envelope
pub mod stability_thresholds {
    /// Relative deviation from the mean that still counts as stable (exclusive)
    pub const TOLERANCE: f64 = 0.25;
    /// Reported for an empty dataset
    pub const VACUOUS_PERCENT: u32 = 100;
}

/// Bands for labelling a Pearson coefficient
pub mod correlation_thresholds {
    /// r above this is a strong positive relationship
    pub const STRONG: f64 = 0.7;
    /// r above this is moderate
    pub const MODERATE: f64 = 0.3;
    /// r above this is weak/neutral; at or below is inverse
    pub const INVERSE: f64 = -0.3;
    /// Minimum paired samples for any coefficient
    pub const MIN_SAMPLES: usize = 2;
    /// Minimum paired samples for a p-value (n-2 degrees of freedom)
    pub const MIN_SAMPLES_FOR_P_VALUE: usize = 3;
}

// ============================================================================
// Tunable threshold sets
// ============================================================================

/// Risk classifier thresholds (`[risk]` in analyzer_config.toml)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(default = "default_critical_ratio")]
    pub critical_ratio: f64,
    #[serde(default = "default_warning_ratio")]
    pub warning_ratio: f64,
    #[serde(default = "default_low_pressure_ratio")]
    pub low_pressure_ratio: f64,
    #[serde(default = "default_health_penalty")]
    pub health_penalty_per_finding: u32,
}

fn default_critical_ratio() -> f64 { risk_thresholds::CRITICAL_RATIO }
fn default_warning_ratio() -> f64 { risk_thresholds::WARNING_RATIO }
fn default_low_pressure_ratio() -> f64 { risk_thresholds::LOW_PRESSURE_RATIO }
fn default_health_penalty() -> u32 { risk_thresholds::HEALTH_PENALTY_PER_FINDING }

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical_ratio: default_critical_ratio(),
            warning_ratio: default_warning_ratio(),
            low_pressure_ratio: default_low_pressure_ratio(),
            health_penalty_per_finding: default_health_penalty(),
        }
    }
}

/// Stability scorer thresholds (`[stability]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityThresholds {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 { stability_thresholds::TOLERANCE }

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

/// Correlation label bands (`[correlation]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationBands {
    #[serde(default = "default_strong")]
    pub strong: f64,
    #[serde(default = "default_moderate")]
    pub moderate: f64,
    #[serde(default = "default_inverse")]
    pub inverse: f64,
}

fn default_strong() -> f64 { correlation_thresholds::STRONG }
fn default_moderate() -> f64 { correlation_thresholds::MODERATE }
fn default_inverse() -> f64 { correlation_thresholds::INVERSE }

impl Default for CorrelationBands {
    fn default() -> Self {
        Self {
            strong: default_strong(),
            moderate: default_moderate(),
            inverse: default_inverse(),
        }
    }
}
