//! Equipment Analyzer: chemical equipment parameter analytics
//!
//! Turns backend-computed dataset summaries into operator-facing statistics.
//!
//! ## Architecture
//!
//! - **Ingest**: Validates loosely-typed backend JSON into fixed, finite records
//! - **Correlation Estimator**: Pearson r between two parameter series, with a qualitative label
//! - **Stability Scorer**: Share of units within ±25% of the fleet mean
//! - **Risk Classifier**: Per-unit Critical/Warning/Stable status against type and global baselines
//! - **Backend Client**: Session-scoped access to history, summaries and uploads

pub mod analytics;
pub mod backend;
pub mod config;
pub mod ingest;
pub mod types;

// Re-export configuration
pub use config::AnalyzerConfig;

// Re-export commonly used types
pub use types::{
    Averages, Coefficient, CorrelationLabel, CorrelationResult, DatasetSummary, EquipmentRow,
    HistoryEntry, Parameter, RiskFinding, RiskReason, RiskStatus, RiskSummary,
};

// Re-export analyzers
pub use analytics::{
    AnalysisReport, CorrelationEstimator, RiskClassifier, StabilityScorer, TypeDistribution,
};

// Re-export backend access
pub use backend::{BackendClient, BackendError, Session};
