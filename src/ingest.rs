//! Backend Summary Ingestion
//!
//! Converts the loosely-typed JSON summary returned by the backend into a
//! validated [`DatasetSummary`]. This is the only place raw row objects are
//! touched; every analyzer downstream works on fixed, finite records.
//!
//! Column names are matched case- and spacing-insensitively, so
//! `"Equipment Name"`, `"equipment_name"` and `"EQUIPMENTNAME"` all resolve to
//! the row name. Numeric cells follow lenient float parsing: the longest
//! numeric prefix of a string is used (`"12.5 bar"` → 12.5) and anything
//! non-numeric, missing or non-finite becomes 0.
//!
//! A payload without a `table` array or an `averages` object is a
//! precondition violation and is reported as an [`IngestError`], never as an
//! empty dataset.

use crate::types::{Averages, BackendInsights, DatasetSummary, EquipmentRow};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Summary ingestion errors
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Summary is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Summary field '{field}' has the wrong shape: expected {expected}")]
    InvalidShape {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Row {index} is not an object")]
    InvalidRow { index: usize },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Normalized column keys recognised in backend rows
mod columns {
    pub const NAME: &[&str] = &["equipmentname", "name"];
    pub const TYPE: &[&str] = &["type", "equipmenttype"];
    pub const FLOWRATE: &[&str] = &["flowrate"];
    pub const PRESSURE: &[&str] = &["pressure"];
    pub const TEMPERATURE: &[&str] = &["temperature"];
}

/// Lowercase and drop whitespace, underscores and hyphens.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Row object re-keyed by normalized column name
struct NormalizedRow<'a> {
    fields: BTreeMap<String, &'a Value>,
}

impl<'a> NormalizedRow<'a> {
    fn new(obj: &'a Map<String, Value>) -> Self {
        let mut fields = BTreeMap::new();
        for (k, v) in obj {
            // First spelling wins when two raw keys normalize identically
            fields.entry(normalize_key(k)).or_insert(v);
        }
        Self { fields }
    }

    fn get(&self, aliases: &[&str]) -> Option<&'a Value> {
        aliases.iter().find_map(|a| self.fields.get(*a).copied())
    }
}

/// Parse the longest leading float literal of `s`, ignoring leading whitespace.
///
/// Accepts an optional sign, digits with an optional fraction, and an optional
/// exponent that is only consumed when followed by digits.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Coerce a raw cell to a finite number; returns `None` when it had to fall back to 0.
fn numeric_cell(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Counts of values that had to be coerced during one ingest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionStats {
    pub coerced_cells: usize,
}

/// Text cell: strings are kept verbatim (type grouping is exact), numbers are
/// rendered, anything else is empty.
fn text_cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce(
    value: Option<&Value>,
    field: &'static str,
    index: usize,
    stats: &mut CoercionStats,
) -> f64 {
    match numeric_cell(value) {
        Some(v) => v,
        None => {
            stats.coerced_cells += 1;
            debug!(row = index, field, raw = ?value, "Non-numeric value coerced to 0");
            0.0
        }
    }
}

/// Convert one backend row object into an [`EquipmentRow`].
pub fn parse_row(
    obj: &Map<String, Value>,
    index: usize,
    stats: &mut CoercionStats,
) -> EquipmentRow {
    let row = NormalizedRow::new(obj);
    EquipmentRow {
        name: text_cell(row.get(columns::NAME)),
        equipment_type: text_cell(row.get(columns::TYPE)),
        flowrate: coerce(row.get(columns::FLOWRATE), "flowrate", index, stats),
        pressure: coerce(row.get(columns::PRESSURE), "pressure", index, stats),
        temperature: coerce(row.get(columns::TEMPERATURE), "temperature", index, stats),
    }
}

fn parse_averages(value: &Value, stats: &mut CoercionStats) -> Result<Averages, IngestError> {
    let obj = value.as_object().ok_or(IngestError::InvalidShape {
        field: "averages",
        expected: "an object",
    })?;
    let avg = NormalizedRow::new(obj);
    let mut field = |aliases: &[&str], name: &'static str| {
        numeric_cell(avg.get(aliases)).unwrap_or_else(|| {
            stats.coerced_cells += 1;
            debug!(field = name, "Average missing or non-numeric, using 0");
            0.0
        })
    };
    Ok(Averages {
        flowrate: field(columns::FLOWRATE, "averages.flowrate"),
        pressure: field(columns::PRESSURE, "averages.pressure"),
        temperature: field(columns::TEMPERATURE, "averages.temperature"),
    })
}

fn parse_distribution(value: Option<&Value>) -> Option<BTreeMap<String, u64>> {
    let obj = value?.as_object()?;
    let counts = obj
        .iter()
        .map(|(k, v)| {
            let count = numeric_cell(Some(v)).map_or(0, |c| c.max(0.0).round() as u64);
            (k.clone(), count)
        })
        .collect();
    Some(counts)
}

fn optional_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validate a backend summary payload.
pub fn summary_from_value(value: &Value) -> Result<DatasetSummary, IngestError> {
    let (summary, _) = summary_from_value_with_stats(value)?;
    Ok(summary)
}

/// Validate a backend summary payload, also reporting how many cells were coerced.
pub fn summary_from_value_with_stats(
    value: &Value,
) -> Result<(DatasetSummary, CoercionStats), IngestError> {
    let obj = value.as_object().ok_or(IngestError::InvalidShape {
        field: "summary",
        expected: "an object",
    })?;

    let table = obj
        .get("table")
        .ok_or(IngestError::MissingField("table"))?
        .as_array()
        .ok_or(IngestError::InvalidShape {
            field: "table",
            expected: "an array of row objects",
        })?;
    let averages_raw = obj
        .get("averages")
        .ok_or(IngestError::MissingField("averages"))?;

    let mut stats = CoercionStats::default();
    let averages = parse_averages(averages_raw, &mut stats)?;

    let rows = table
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            raw.as_object()
                .map(|o| parse_row(o, index, &mut stats))
                .ok_or(IngestError::InvalidRow { index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let summary = DatasetSummary {
        rows,
        averages,
        type_distribution: parse_distribution(obj.get("type_distribution")),
        insights: BackendInsights {
            analytics: optional_text(obj, "analytics_insight"),
            trends: optional_text(obj, "trends_insight"),
        },
    };

    info!(
        rows = summary.rows.len(),
        coerced = stats.coerced_cells,
        "Ingested dataset summary"
    );
    Ok((summary, stats))
}

/// Parse and validate a backend summary from JSON text.
pub fn summary_from_str(json: &str) -> Result<DatasetSummary, IngestError> {
    let value: Value = serde_json::from_str(json)?;
    summary_from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("12.5"), Some(12.5));
        assert_eq!(parse_float_prefix("  -3"), Some(-3.0));
        assert_eq!(parse_float_prefix("12.5 bar"), Some(12.5));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("7."), Some(7.0));
        assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("."), None);
    }

    #[test]
    fn test_keys_are_case_and_spacing_insensitive() {
        let raw = json!({
            "Equipment Name": "Pump-1",
            "TYPE": "Pump",
            "flow_rate": "120.5",
            " Pressure ": 6.2,
            "temperature": "110"
        });
        let mut stats = CoercionStats::default();
        let row = parse_row(raw.as_object().unwrap(), 0, &mut stats);
        assert_eq!(row.name, "Pump-1");
        assert_eq!(row.equipment_type, "Pump");
        assert_eq!(row.flowrate, 120.5);
        assert_eq!(row.pressure, 6.2);
        assert_eq!(row.temperature, 110.0);
        assert_eq!(stats.coerced_cells, 0);
    }

    #[test]
    fn test_type_text_is_kept_verbatim() {
        let mut stats = CoercionStats::default();
        let padded = json!({"Equipment Name": "P-1", "Type": "Pump ", "Pressure": 1});
        let plain = json!({"Equipment Name": "P-2", "Type": "Pump", "Pressure": 1});
        let a = parse_row(padded.as_object().unwrap(), 0, &mut stats);
        let b = parse_row(plain.as_object().unwrap(), 1, &mut stats);
        assert_eq!(a.equipment_type, "Pump ");
        assert_ne!(a.equipment_type, b.equipment_type);
    }

    #[test]
    fn test_malformed_values_coerce_to_zero() {
        let raw = json!({
            "Equipment Name": "Valve-9",
            "Type": "Valve",
            "Flowrate": "n/a",
            "Pressure": null
        });
        let mut stats = CoercionStats::default();
        let row = parse_row(raw.as_object().unwrap(), 3, &mut stats);
        assert_eq!(row.flowrate, 0.0);
        assert_eq!(row.pressure, 0.0);
        assert_eq!(row.temperature, 0.0);
        assert_eq!(stats.coerced_cells, 3);
    }

    #[test]
    fn test_summary_from_value() {
        let payload = json!({
            "total_equipment": 2,
            "averages": {"flowrate": 100.0, "pressure": 5.0, "temperature": 80.0},
            "table": [
                {"Equipment Name": "P-1", "Type": "Pump", "Flowrate": 90, "Pressure": 4, "Temperature": 70},
                {"Equipment Name": "V-1", "Type": "Valve", "Flowrate": 110, "Pressure": 6, "Temperature": 90}
            ],
            "type_distribution": {"Pump": 1, "Valve": 1},
            "analytics_insight": "Pressure tracks temperature."
        });
        let summary = summary_from_value(&payload).unwrap();
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.averages.pressure, 5.0);
        assert_eq!(summary.type_distribution.as_ref().map(|d| d.len()), Some(2));
        assert_eq!(
            summary.insights.analytics.as_deref(),
            Some("Pressure tracks temperature.")
        );
        assert!(summary.insights.trends.is_none());
    }

    #[test]
    fn test_missing_table_is_precondition_violation() {
        let payload = json!({"averages": {"flowrate": 1, "pressure": 1, "temperature": 1}});
        let err = summary_from_value(&payload).unwrap_err();
        assert!(matches!(err, IngestError::MissingField("table")));
    }

    #[test]
    fn test_missing_averages_is_precondition_violation() {
        let payload = json!({"table": []});
        let err = summary_from_value(&payload).unwrap_err();
        assert!(matches!(err, IngestError::MissingField("averages")));
    }

    #[test]
    fn test_empty_table_is_valid() {
        let payload = json!({"table": [], "averages": {}});
        let (summary, stats) = summary_from_value_with_stats(&payload).unwrap();
        assert!(summary.is_empty());
        assert_eq!(stats.coerced_cells, 3);
    }

    #[test]
    fn test_non_object_row_rejected() {
        let payload = json!({"table": [{"Type": "Pump"}, 42], "averages": {}});
        let err = summary_from_value(&payload).unwrap_err();
        assert!(matches!(err, IngestError::InvalidRow { index: 1 }));
    }

    #[test]
    fn test_table_wrong_shape() {
        let payload = json!({"table": {"rows": []}, "averages": {}});
        let err = summary_from_value(&payload).unwrap_err();
        assert!(matches!(err, IngestError::InvalidShape { field: "table", .. }));
    }

    #[test]
    fn test_summary_from_str_rejects_bad_json() {
        assert!(matches!(summary_from_str("{not json"), Err(IngestError::Json(_))));
    }
}
