//! Backend Client - HTTP client for the equipment analytics REST API
//!
//! Handles login, run history, dataset summaries and CSV uploads. Summaries
//! pass through [`crate::ingest`] so callers only ever see validated records.

use std::path::Path;
use std::time::Duration;

use futures::future::join_all;
use reqwest::{multipart, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::session::{Session, TokenPair};
use crate::analytics::trends::{build_series, select_recent_runs, TrendConfig, TrendSeries};
use crate::config::BackendConfig;
use crate::ingest::{self, IngestError};
use crate::types::{DatasetSummary, HistoryEntry, UploadReceipt};

/// Backend client errors
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not authorized (401): {}", unauthorized_text(.message))]
    Unauthorized { message: Option<String> },

    #[error("Server returned status {status}{}", message_suffix(.message))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Malformed summary: {0}")]
    Ingest(#[from] IngestError),

    #[error("Failed to read upload file ({}): {}", .0.display(), .1)]
    Io(std::path::PathBuf, std::io::Error),
}

fn unauthorized_text(message: &Option<String>) -> &str {
    message
        .as_deref()
        .unwrap_or("log in again or supply a fresh token")
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Error body shapes used by the backend (`{error}` on uploads, `{detail}` on auth)
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.error.or(self.detail).filter(|m| !m.trim().is_empty())
    }
}

/// HTTP client for the analytics backend
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the configured base URL and timeout.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authed(&self, req: RequestBuilder, session: &Session) -> RequestBuilder {
        req.header(reqwest::header::AUTHORIZATION, session.bearer())
    }

    /// Exchange credentials for a session
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, BackendError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let resp = self.http.post(self.url("token/")).json(&body).send().await?;
        let pair: TokenPair = check_status(resp).await?.json().await?;
        info!(user = %username, "Logged in to backend");
        Ok(pair.into())
    }

    /// Create a new backend account
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), BackendError> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        let resp = self
            .http
            .post(self.url("register/"))
            .json(&body)
            .send()
            .await?;
        check_status(resp).await?;
        info!(user = %username, "Registered backend account");
        Ok(())
    }

    /// Uploaded runs, newest first
    pub async fn history(&self, session: &Session) -> Result<Vec<HistoryEntry>, BackendError> {
        let resp = self
            .authed(self.http.get(self.url("history/")), session)
            .send()
            .await?;
        let history: Vec<HistoryEntry> = check_status(resp).await?.json().await?;
        debug!(runs = history.len(), "Fetched run history");
        Ok(history)
    }

    /// Computed summary of one run
    pub async fn summary(
        &self,
        session: &Session,
        dataset_id: u64,
    ) -> Result<DatasetSummary, BackendError> {
        let resp = self
            .authed(
                self.http.get(self.url(&format!("summary/{dataset_id}/"))),
                session,
            )
            .send()
            .await?;
        let raw: serde_json::Value = check_status(resp).await?.json().await?;
        let summary = ingest::summary_from_value(&raw)?;
        debug!(dataset_id, rows = summary.rows.len(), "Fetched dataset summary");
        Ok(summary)
    }

    /// Upload CSV bytes as multipart field `file`
    pub async fn upload(
        &self,
        session: &Session,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<UploadReceipt, BackendError> {
        let size = contents.len();
        let part = multipart::Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .authed(self.http.post(self.url("upload/")), session)
            .multipart(form)
            .send()
            .await?;
        let receipt: UploadReceipt = check_status(resp).await?.json().await?;
        info!(file = %file_name, bytes = size, dataset_id = receipt.dataset_id, "Dataset uploaded");
        Ok(receipt)
    }

    /// Read a CSV from disk and upload it under its file name
    pub async fn upload_file(
        &self,
        session: &Session,
        path: &Path,
    ) -> Result<UploadReceipt, BackendError> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| BackendError::Io(path.to_path_buf(), e))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload.csv".to_string(), |n| n.to_string_lossy().into_owned());
        self.upload(session, &file_name, contents).await
    }

    /// Fetch summaries for `runs` concurrently.
    ///
    /// Individual failures are logged and yield `None`; order matches `runs`.
    pub async fn fetch_summaries<'a>(
        &self,
        session: &Session,
        runs: &[&'a HistoryEntry],
    ) -> Vec<(&'a HistoryEntry, Option<DatasetSummary>)> {
        let requests = runs.iter().map(|&run| async move {
            match self.summary(session, run.id).await {
                Ok(summary) => (run, Some(summary)),
                Err(e) => {
                    warn!(dataset_id = run.id, error = %e, "Skipping run in trend");
                    (run, None)
                }
            }
        });
        join_all(requests).await
    }

    /// Multi-run trend over the newest `config.runs` entries of `history`.
    ///
    /// Returns `None` when history is empty or every summary fetch failed.
    pub async fn trends(
        &self,
        session: &Session,
        history: &[HistoryEntry],
        config: &TrendConfig,
    ) -> Option<TrendSeries> {
        let recent = select_recent_runs(history, config.runs);
        if recent.is_empty() {
            return None;
        }

        let fetched = self.fetch_summaries(session, &recent).await;
        let pairs: Vec<(&HistoryEntry, Option<&DatasetSummary>)> = fetched
            .iter()
            .map(|(run, summary)| (*run, summary.as_ref()))
            .collect();

        let series = build_series(&pairs, config);
        if let Some(ref s) = series {
            info!(requested = recent.len(), fetched = s.len(), "Trend series built");
        }
        series
    }
}

/// Map non-success statuses to errors, keeping the backend's message if any.
async fn check_status(resp: Response) -> Result<Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(ErrorBody::message);
    if status == StatusCode::UNAUTHORIZED {
        return Err(BackendError::Unauthorized { message });
    }
    Err(BackendError::Status { status, message })
}
