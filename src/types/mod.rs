//! Shared data structures for equipment parameter analytics
//!
//! This module defines the core types flowing through the analyzer:
//! - EquipmentRow / DatasetSummary: validated backend summary (ingest output)
//! - CorrelationResult: Correlation Estimator output
//! - RiskFinding / RiskSummary: Risk Classifier output
//! - HistoryEntry: one uploaded run as listed by the backend
//! - thresholds: classification constants and tunable threshold sets

mod equipment;
mod analysis;
mod run;
pub mod thresholds;

pub use equipment::*;
pub use analysis::*;
pub use run::*;
pub use thresholds::*;
