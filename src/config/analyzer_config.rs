//! Analyzer Configuration - classification thresholds as operator-tunable TOML values
//!
//! Each section implements `Default` with the documented classification
//! constants, so running without a config file reproduces the reference
//! behavior exactly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults::{
    BACKEND_BASE_URL, BACKEND_HTTP_TIMEOUT_SECS, BACKEND_URL_ENV_VAR, CONFIG_ENV_VAR,
    LOCAL_CONFIG_FILE,
};
use crate::analytics::trends::TrendConfig;
use crate::types::{CorrelationBands, RiskThresholds, StabilityThresholds};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `AnalyzerConfig::load()` which searches:
/// 1. `$EQUIPMENT_ANALYZER_CONFIG`
/// 2. `./analyzer_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Risk classifier ratios and health penalty
    #[serde(default)]
    pub risk: RiskThresholds,

    /// Stability envelope
    #[serde(default)]
    pub stability: StabilityThresholds,

    /// Correlation label bands
    #[serde(default)]
    pub correlation: CorrelationBands,

    /// Multi-run trend window
    #[serde(default)]
    pub trends: TrendConfig,

    /// Backend REST API
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Backend REST API settings (`[backend]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    BACKEND_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    BACKEND_HTTP_TIMEOUT_SECS
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration using the standard search order:
    /// 1. `$EQUIPMENT_ANALYZER_CONFIG` environment variable
    /// 2. `./analyzer_config.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// `$EQUIPMENT_API_URL` overrides `backend.base_url` in every case.
    pub fn load() -> Self {
        let mut config = Self::load_from_search_path();
        if let Ok(url) = std::env::var(BACKEND_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                info!(url = %url, "Backend URL overridden from {}", BACKEND_URL_ENV_VAR);
                config.backend.base_url = url;
            }
        }
        config
    }

    fn load_from_search_path() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded analyzer config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./analyzer_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded analyzer config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::ParseStr(err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(ConfigError::ParseStr)?;
        config.validate()?;
        for w in super::validation::plausibility_warnings(&config) {
            warn!("{}", w);
        }
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Analyzer config saved");
        Ok(())
    }

    /// Validate all thresholds for internal consistency.
    ///
    /// Rules:
    /// - All ratios and bands must be finite
    /// - critical_ratio >= warning_ratio > low_pressure_ratio > 0
    /// - stability tolerance must be > 0
    /// - correlation bands: strong >= moderate >= inverse, all within [-1, 1]
    /// - trend runs and label length must be > 0
    /// - backend base_url must be http(s) and timeout > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let r = &self.risk;
        Self::check_escalation(r.warning_ratio, r.critical_ratio, "risk.ratio", &mut errors);
        if !r.low_pressure_ratio.is_finite() || r.low_pressure_ratio <= 0.0 {
            errors.push(format!(
                "risk.low_pressure_ratio ({}) must be a positive finite number",
                r.low_pressure_ratio
            ));
        } else if r.low_pressure_ratio >= r.warning_ratio {
            errors.push(format!(
                "risk.low_pressure_ratio ({:.2}) must be less than warning_ratio ({:.2})",
                r.low_pressure_ratio, r.warning_ratio
            ));
        }
        if r.health_penalty_per_finding == 0 {
            errors.push("risk.health_penalty_per_finding must be > 0".to_string());
        }

        let tol = self.stability.tolerance;
        if !tol.is_finite() || tol <= 0.0 {
            errors.push(format!("stability.tolerance ({tol}) must be a positive finite number"));
        }

        let c = &self.correlation;
        if [c.strong, c.moderate, c.inverse].iter().any(|v| !v.is_finite()) {
            errors.push("correlation bands must be finite".to_string());
        } else {
            if !(c.strong >= c.moderate && c.moderate >= c.inverse) {
                errors.push(format!(
                    "correlation bands must satisfy strong ({:.2}) >= moderate ({:.2}) >= inverse ({:.2})",
                    c.strong, c.moderate, c.inverse
                ));
            }
            if [c.strong, c.moderate, c.inverse].iter().any(|v| !(-1.0..=1.0).contains(v)) {
                errors.push("correlation bands must lie within [-1, 1]".to_string());
            }
        }

        if self.trends.runs == 0 {
            errors.push("trends.runs must be > 0".to_string());
        }
        if self.trends.label_max_chars == 0 {
            errors.push("trends.label_max_chars must be > 0".to_string());
        }

        let b = &self.backend;
        if !(b.base_url.starts_with("http://") || b.base_url.starts_with("https://")) {
            errors.push(format!(
                "backend.base_url ('{}') must start with http:// or https://",
                b.base_url
            ));
        }
        if b.timeout_secs == 0 {
            errors.push("backend.timeout_secs must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_escalation(warning: f64, critical: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons are always false, so reject non-finite values explicitly
        if !warning.is_finite() || !critical.is_finite() {
            errors.push(format!(
                "{name}: values must be finite (got warning={warning}, critical={critical})"
            ));
            return;
        }
        if critical < warning {
            errors.push(format!(
                "{name}: critical ({critical:.3}) must be >= warning ({warning:.3})"
            ));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),

    #[error("Config parse error: {0}")]
    ParseStr(toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),

    #[error("Config validation failed:\n{}", format_errors(.0))]
    Validation(Vec<String>),
}

fn format_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnalyzerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = AnalyzerConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn test_inverted_risk_ratios_rejected() {
        let config = AnalyzerConfig {
            risk: RiskThresholds {
                critical_ratio: 1.1,
                warning_ratio: 1.3,
                ..RiskThresholds::default()
            },
            ..AnalyzerConfig::default()
        };
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("risk.ratio")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_tolerance_rejected() {
        let mut config = AnalyzerConfig::default();
        config.stability.tolerance = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_preserves_values() {
        let mut config = AnalyzerConfig::default();
        config.risk.critical_ratio = 1.8;
        config.trends.runs = 8;
        let text = config.to_toml().unwrap();
        let parsed = AnalyzerConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validation_error_lists_every_problem() {
        let mut config = AnalyzerConfig::default();
        config.trends.runs = 0;
        config.backend.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("trends.runs"));
        assert!(text.contains("backend.timeout_secs"));
    }
}
