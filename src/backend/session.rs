//! Authenticated session handed to every backend call

use serde::Deserialize;

/// Bearer credentials for the backend API.
///
/// Sessions are plain values owned by the caller; nothing is cached
/// process-wide.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access: String,
    refresh: Option<String>,
}

impl Session {
    /// Wrap an access token obtained elsewhere (CLI flag, env var).
    pub fn new(access: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: None,
        }
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access)
    }

    pub fn access_token(&self) -> &str {
        &self.access
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_deref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access", &"<redacted>")
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `POST /token/` response body
#[derive(Debug, Deserialize)]
pub(crate) struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl From<TokenPair> for Session {
    fn from(pair: TokenPair) -> Self {
        Self {
            access: pair.access,
            refresh: pair.refresh,
        }
    }
}
