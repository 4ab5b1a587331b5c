//! Config Validation Tests
//!
//! Typo detection, plausibility warnings and consistency checks for
//! analyzer_config.toml, exercised independently from the analyzers.

use std::io::Write;

use equipment_analyzer::config::validation::{
    known_config_keys, plausibility_warnings, suggest_correction, validate_unknown_keys,
};
use equipment_analyzer::config::{AnalyzerConfig, ConfigError};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_risk_ratio_warns_with_suggestion() {
    let toml_str = r#"
[risk]
critcal_ratio = 1.6
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("critcal_ratio"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("risk.critical_ratio"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[risk]
critical_ratio = 1.6
warning_ratio = 1.25
low_pressure_ratio = 0.4
health_penalty_per_finding = 4

[stability]
tolerance = 0.2

[correlation]
strong = 0.8
moderate = 0.4
inverse = -0.4

[trends]
runs = 8
label_max_chars = 12

[backend]
base_url = "https://equipment.example.com/api"
timeout_secs = 10
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}

#[test]
fn unrelated_key_has_no_suggestion() {
    let warnings = validate_unknown_keys("completely_unrelated_setting = true\n");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].suggestion.is_none());
}

#[test]
fn every_default_field_is_a_known_key() {
    let text = AnalyzerConfig::default().to_toml().unwrap();
    assert!(validate_unknown_keys(&text).is_empty());
    assert!(known_config_keys().contains("backend.timeout_secs"));
}

#[test]
fn suggestion_respects_edit_distance_limit() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("trends.run", &known).as_deref(),
        Some("trends.runs")
    );
    assert!(suggest_correction("trends.history_window", &known).is_none());
}

// ============================================================================
// Consistency and Loading
// ============================================================================

#[test]
fn unknown_keys_do_not_fail_load() {
    let config = AnalyzerConfig::from_toml_str("[stability]\ntolerence = 0.3\n").unwrap();
    // Misspelled key is ignored; default tolerance stays in effect
    assert!((config.stability.tolerance - 0.25).abs() < f64::EPSILON);
}

#[test]
fn inconsistent_thresholds_are_rejected() {
    let toml_str = r#"
[risk]
critical_ratio = 1.1
warning_ratio = 1.3

[correlation]
strong = 0.2
moderate = 0.5
"#;
    match AnalyzerConfig::from_toml_str(toml_str) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("risk.ratio")));
            assert!(errors.iter().any(|e| e.contains("correlation bands")));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn non_http_base_url_is_rejected() {
    let result = AnalyzerConfig::from_toml_str("[backend]\nbase_url = \"ftp://host/api\"\n");
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn plausibility_flags_wide_tolerance() {
    let config = AnalyzerConfig::from_toml_str("[stability]\ntolerance = 2.0\n").unwrap();
    let warnings = plausibility_warnings(&config);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "stability.tolerance");
}

#[test]
fn load_from_file_and_save_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[trends]\nruns = 3").unwrap();

    let config = AnalyzerConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.trends.runs, 3);
    assert_eq!(config.trends.label_max_chars, 10);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("analyzer_config.toml");
    config.save_to_file(&out).unwrap();
    assert_eq!(AnalyzerConfig::load_from_file(&out).unwrap(), config);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    let err = AnalyzerConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn syntax_error_is_a_parse_error_with_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[risk\ncritical_ratio = ").unwrap();
    let err = AnalyzerConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
}
