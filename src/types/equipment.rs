//! Equipment rows and the dataset summary they arrive in

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Numeric process parameter carried by every equipment row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Flowrate,
    Pressure,
    Temperature,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [Parameter::Flowrate, Parameter::Pressure, Parameter::Temperature];

    /// Display unit used by the dashboard
    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Flowrate => "m³/h",
            Parameter::Pressure => "bar",
            Parameter::Temperature => "°C",
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parameter::Flowrate => write!(f, "Flowrate"),
            Parameter::Pressure => write!(f, "Pressure"),
            Parameter::Temperature => write!(f, "Temperature"),
        }
    }
}

impl std::str::FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flowrate" | "flow" => Ok(Parameter::Flowrate),
            "pressure" => Ok(Parameter::Pressure),
            "temperature" | "temp" => Ok(Parameter::Temperature),
            other => Err(format!("unknown parameter '{other}'")),
        }
    }
}

/// Map non-finite values to 0 so every stored measurement is usable in arithmetic.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Ratio denominator: a zero (or non-finite) baseline is treated as 1.
pub fn nonzero_or_one(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        1.0
    } else {
        value
    }
}

/// One physical unit's measurement, validated at the ingest boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRow {
    /// Equipment name ("Equipment Name" column)
    pub name: String,
    /// Categorical equipment class, e.g. Pump or Valve
    pub equipment_type: String,
    /// Flowrate (m³/h)
    pub flowrate: f64,
    /// Pressure (bar)
    pub pressure: f64,
    /// Temperature (°C)
    pub temperature: f64,
}

impl EquipmentRow {
    /// Build a row, coercing non-finite measurements to 0.
    pub fn new(
        name: impl Into<String>,
        equipment_type: impl Into<String>,
        flowrate: f64,
        pressure: f64,
        temperature: f64,
    ) -> Self {
        Self {
            name: name.into(),
            equipment_type: equipment_type.into(),
            flowrate: finite_or_zero(flowrate),
            pressure: finite_or_zero(pressure),
            temperature: finite_or_zero(temperature),
        }
    }

    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Flowrate => self.flowrate,
            Parameter::Pressure => self.pressure,
            Parameter::Temperature => self.temperature,
        }
    }
}

/// Backend-computed global averages, trusted as-is
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl Averages {
    pub fn new(flowrate: f64, pressure: f64, temperature: f64) -> Self {
        Self {
            flowrate: finite_or_zero(flowrate),
            pressure: finite_or_zero(pressure),
            temperature: finite_or_zero(temperature),
        }
    }

    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Flowrate => self.flowrate,
            Parameter::Pressure => self.pressure,
            Parameter::Temperature => self.temperature,
        }
    }
}

/// Backend-written narrative text attached to a summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendInsights {
    /// Correlation narrative (`analytics_insight`)
    #[serde(default)]
    pub analytics: Option<String>,
    /// Multi-run trend narrative (`trends_insight`)
    #[serde(default)]
    pub trends: Option<String>,
}

/// The aggregate every analyzer consumes: rows plus precomputed averages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: Vec<EquipmentRow>,
    pub averages: Averages,
    /// Per-type row counts as reported by the backend, if it sent them
    #[serde(default)]
    pub type_distribution: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub insights: BackendInsights,
}

impl DatasetSummary {
    pub fn new(rows: Vec<EquipmentRow>, averages: Averages) -> Self {
        Self {
            rows,
            averages,
            type_distribution: None,
            insights: BackendInsights::default(),
        }
    }

    /// Values of one parameter across all rows, in row order
    pub fn series(&self, parameter: Parameter) -> Vec<f64> {
        self.rows.iter().map(|r| r.value(parameter)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
