//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility checks on threshold values.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for AnalyzerConfig.
///
/// Any new field added to AnalyzerConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [risk]
        "risk",
        "risk.critical_ratio",
        "risk.warning_ratio",
        "risk.low_pressure_ratio",
        "risk.health_penalty_per_finding",
        // [stability]
        "stability",
        "stability.tolerance",
        // [correlation]
        "correlation",
        "correlation.strong",
        "correlation.moderate",
        "correlation.inverse",
        // [trends]
        "trends",
        "trends.runs",
        "trends.label_max_chars",
        // [backend]
        "backend",
        "backend.base_url",
        "backend.timeout_secs",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Collects every dotted key path in a TOML tree, tables included.
///
/// `{ risk = { warning_ratio = 1.2 } }` yields `["risk", "risk.warning_ratio"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Character-level edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3. Ties resolve alphabetically.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Unknown keys only warn. Syntax errors are left for serde to report.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            message: format!("Unknown config key '{key}'"),
            suggestion: suggest_correction(&key, &known),
            field: key,
        })
        .collect()
}

// ============================================================================
// Plausibility Warnings
// ============================================================================

/// Flag values that pass `validate()` but are unlikely to be intended.
pub fn plausibility_warnings(config: &super::AnalyzerConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let critical = config.risk.critical_ratio;
    if critical > 5.0 {
        warnings.push(ValidationWarning {
            field: "risk.critical_ratio".to_string(),
            message: format!(
                "risk.critical_ratio = {critical:.2} would only flag units running at over 5x their baseline"
            ),
            suggestion: None,
        });
    }

    let tol = config.stability.tolerance;
    if tol >= 1.0 {
        warnings.push(ValidationWarning {
            field: "stability.tolerance".to_string(),
            message: format!(
                "stability.tolerance = {tol:.2} accepts deviations of 100% or more from the mean"
            ),
            suggestion: None,
        });
    }

    if config.trends.runs > 50 {
        warnings.push(ValidationWarning {
            field: "trends.runs".to_string(),
            message: format!(
                "trends.runs = {} issues one summary request per run",
                config.trends.runs
            ),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================
