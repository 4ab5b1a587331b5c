//! Analyzer Configuration Module
//!
//! Provides operator-tunable classification thresholds and backend settings
//! loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `EQUIPMENT_ANALYZER_CONFIG` environment variable (path to TOML file)
//! 2. `analyzer_config.toml` in the current working directory
//! 3. Built-in defaults (the documented classification constants)
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(AnalyzerConfig::load());
//!
//! // At a call site that has no config passed in:
//! let limit = config::get().risk.critical_ratio;
//! ```
//!
//! The analyzers never read this global; callers pass thresholds explicitly.

mod analyzer_config;
pub mod defaults;
pub mod validation;

pub use analyzer_config::*;

use std::sync::OnceLock;

/// Process-wide analyzer configuration, set once at startup.
static ANALYZER_CONFIG: OnceLock<AnalyzerConfig> = OnceLock::new();

/// Install the process-wide configuration.
///
/// A second call is ignored with a warning.
pub fn init(config: AnalyzerConfig) {
    if ANALYZER_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// The process-wide configuration, or built-in defaults if `init()` was never called.
pub fn get() -> &'static AnalyzerConfig {
    ANALYZER_CONFIG.get_or_init(AnalyzerConfig::default)
}
