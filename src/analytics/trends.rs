//! Multi-run trend series
//!
//! Builds the average-parameter series across the most recent uploaded runs.
//! History arrives newest first; the series runs oldest to newest. Runs whose
//! summary could not be fetched are skipped rather than plotted as gaps.

use crate::types::{DatasetSummary, HistoryEntry};
use serde::{Deserialize, Serialize};

/// Default number of recent runs in a trend
pub const DEFAULT_TREND_RUNS: usize = 5;

/// Default maximum label length (characters)
pub const DEFAULT_LABEL_MAX_CHARS: usize = 10;

/// Trend settings (`[trends]` in analyzer_config.toml)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendConfig {
    #[serde(default = "default_runs")]
    pub runs: usize,
    #[serde(default = "default_label_max_chars")]
    pub label_max_chars: usize,
}

fn default_runs() -> usize { DEFAULT_TREND_RUNS }
fn default_label_max_chars() -> usize { DEFAULT_LABEL_MAX_CHARS }

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            label_max_chars: default_label_max_chars(),
        }
    }
}

/// Averages of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub run_id: u64,
    pub label: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// Oldest-to-newest averages with a narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
    pub insight: String,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn flowrate(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.flowrate).collect()
    }

    pub fn pressure(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.pressure).collect()
    }

    pub fn temperature(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.temperature).collect()
    }
}

/// The `count` newest runs, oldest first.
pub fn select_recent_runs(history: &[HistoryEntry], count: usize) -> Vec<&HistoryEntry> {
    let mut recent: Vec<&HistoryEntry> = history.iter().take(count).collect();
    recent.reverse();
    recent
}

/// Chart label for a run: its file name cut to `max_chars`, or `Run {index}`.
pub fn run_label(run: &HistoryEntry, index: usize, max_chars: usize) -> String {
    let name = run
        .display_name()
        .map_or_else(|| format!("Run {index}"), str::to_string);
    name.chars().take(max_chars).collect()
}

fn fallback_insight(runs: usize) -> String {
    format!(
        "Based on the last {runs} runs, your plant maintains high pressure stability. \
         Flowrates show slight seasonal variance but remain within operational limits."
    )
}

/// Build a trend from runs paired with their fetched summaries (oldest first).
///
/// Returns None when no summary was fetched. The insight is the newest
/// summary's backend narrative when present.
pub fn build_series(
    runs: &[(&HistoryEntry, Option<&DatasetSummary>)],
    config: &TrendConfig,
) -> Option<TrendSeries> {
    let fetched: Vec<(&HistoryEntry, &DatasetSummary)> = runs
        .iter()
        .filter_map(|(run, summary)| summary.map(|s| (*run, s)))
        .collect();

    let (_, newest) = fetched.last()?;
    let insight = newest
        .insights
        .trends
        .clone()
        .unwrap_or_else(|| fallback_insight(fetched.len()));

    let points = fetched
        .iter()
        .enumerate()
        .map(|(i, (run, summary))| TrendPoint {
            run_id: run.id,
            label: run_label(run, i, config.label_max_chars),
            flowrate: summary.averages.flowrate,
            pressure: summary.averages.pressure,
            temperature: summary.averages.temperature,
        })
        .collect();

    Some(TrendSeries { points, insight })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Averages;

    fn entry(id: u64, name: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            id,
            filename: name.map(str::to_string),
            original_filename: None,
            uploaded_at: None,
        }
    }

    fn summary_with(pressure: f64, trends: Option<&str>) -> DatasetSummary {
        let mut s = DatasetSummary::new(Vec::new(), Averages::new(100.0, pressure, 60.0));
        s.insights.trends = trends.map(str::to_string);
        s
    }

    #[test]
    fn test_select_recent_runs_oldest_first() {
        let history: Vec<HistoryEntry> = (1..=7).rev().map(|id| entry(id, None)).collect();
        let ids: Vec<u64> = select_recent_runs(&history, 5).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_select_recent_runs_short_history() {
        let history = vec![entry(2, None), entry(1, None)];
        assert_eq!(select_recent_runs(&history, 5).len(), 2);
    }

    #[test]
    fn test_run_label_truncates_and_falls_back() {
        assert_eq!(run_label(&entry(1, Some("plant_alpha_2026.csv")), 0, 10), "plant_alph");
        assert_eq!(run_label(&entry(1, None), 3, 10), "Run 3");
        assert_eq!(run_label(&entry(1, Some("")), 2, 10), "Run 2");
    }

    #[test]
    fn test_build_series_skips_failed_runs() {
        let a = entry(1, Some("a.csv"));
        let b = entry(2, Some("b.csv"));
        let c = entry(3, Some("c.csv"));
        let sa = summary_with(5.0, None);
        let sc = summary_with(7.0, Some("Pressure is trending up."));

        let runs = vec![(&a, Some(&sa)), (&b, None), (&c, Some(&sc))];
        let series = build_series(&runs, &TrendConfig::default()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.pressure(), vec![5.0, 7.0]);
        assert_eq!(series.points[1].run_id, 3);
        assert_eq!(series.insight, "Pressure is trending up.");
    }

    #[test]
    fn test_build_series_fallback_insight() {
        let a = entry(1, Some("a.csv"));
        let sa = summary_with(5.0, None);
        let series = build_series(&[(&a, Some(&sa))], &TrendConfig::default()).unwrap();
        assert!(series.insight.starts_with("Based on the last 1 runs"));
    }

    #[test]
    fn test_build_series_none_when_nothing_fetched() {
        let a = entry(1, None);
        assert!(build_series(&[(&a, None)], &TrendConfig::default()).is_none());
        assert!(build_series(&[], &TrendConfig::default()).is_none());
    }
}
