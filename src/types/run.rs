//! Uploaded-run records as listed by the backend history endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded dataset in the user's history (newest first from the backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    /// Human name of the run: original file name, then stored file name
    pub fn display_name(&self) -> Option<&str> {
        self.original_filename
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.filename.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Response of a successful CSV upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub dataset_id: u64,
}
