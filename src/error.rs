//! Error types for the harvester

use thiserror::Error;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Result type alias for harvest operations
pub type HarvestResult<T> = std::result::Result<T, HarvestError>;

/// Error types for configuration, transport, parsing and persistence
#[derive(Error, Debug, Clone)]
pub enum HarvestError {
    /// HTTP request failed
    #[error("HTTP request failed: {message}")]
    HttpError {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },

    /// Timeout error
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Invalid or inconsistent search configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unsupported write mode
    #[error("Invalid write mode: {0}")]
    ModeError(String),

    /// Response body was not valid JSON
    #[error("Parsing error: {0}")]
    ParseError(String),

    /// Filesystem failure while persisting a response
    #[error("IO error: {0}")]
    IoError(String),
}

impl HarvestError {
    /// Whether the error came from the request/transport layer.
    ///
    /// Only these errors are eligible for the re-encoded keyword retry.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HarvestError::HttpError { .. } | HarvestError::Timeout { .. }
        )
    }
}

impl From<reqwest::Error> for HarvestError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            HarvestError::Timeout {
                timeout_ms: DEFAULT_TIMEOUT_MS,
            }
        } else {
            HarvestError::HttpError {
                message: error.to_string(),
                status_code: error.status().map(|s| s.as_u16()),
                response_body: None,
            }
        }
    }
}

impl From<serde_json::Error> for HarvestError {
    fn from(error: serde_json::Error) -> Self {
        HarvestError::ParseError(format!("JSON parsing failed: {error}"))
    }
}

impl From<serde_yaml::Error> for HarvestError {
    fn from(error: serde_yaml::Error) -> Self {
        HarvestError::ConfigError(format!("YAML parsing failed: {error}"))
    }
}

impl From<std::io::Error> for HarvestError {
    fn from(error: std::io::Error) -> Self {
        HarvestError::IoError(error.to_string())
    }
}
