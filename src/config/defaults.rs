//! System-wide default constants.
//!
//! Classification constants live in `types::thresholds`; this module holds
//! the ambient settings of the CLI and backend client.

// ============================================================================
// Configuration discovery
// ============================================================================

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV_VAR: &str = "EQUIPMENT_ANALYZER_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "analyzer_config.toml";

// ============================================================================
// Backend
// ============================================================================

/// Backend API base URL when neither config nor environment provides one.
pub const BACKEND_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding `backend.base_url`.
pub const BACKEND_URL_ENV_VAR: &str = "EQUIPMENT_API_URL";

/// Environment variable holding the bearer token for the CLI.
pub const BACKEND_TOKEN_ENV_VAR: &str = "EQUIPMENT_API_TOKEN";

/// HTTP client timeout for backend requests (seconds).
pub const BACKEND_HTTP_TIMEOUT_SECS: u64 = 30;
