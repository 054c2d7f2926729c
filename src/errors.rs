// errors.rs
use thiserror::Error;

use crate::config::ConfigError;

/// A single upstream request that did not produce a usable response.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Unauthorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("Rate limited (HTTP 429): {0}")]
    RateLimited(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Upstream server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Classifies a non-success HTTP status. 403 is an auth/config problem, never a
    /// rate limit, even though some providers use it for both.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => UpstreamError::Unauthorized { status, message },
            404 => UpstreamError::NotFound(message),
            429 => UpstreamError::RateLimited(message),
            500..=599 => UpstreamError::Server { status, message },
            _ => UpstreamError::Rejected { status, message },
        }
    }

    /// Only these are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            UpstreamError::RateLimited(_) | UpstreamError::Server { .. } | UpstreamError::Network(_)
        )
    }

    pub fn category(&self) -> &'static str {
        match self {
            UpstreamError::Unauthorized { .. } => "unauthorized",
            UpstreamError::RateLimited(_) => "rate_limited",
            UpstreamError::NotFound(_) => "not_found",
            UpstreamError::Rejected { .. } => "rejected",
            UpstreamError::Server { .. } => "server",
            UpstreamError::Network(_) => "network",
            UpstreamError::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Network(e.to_string())
        }
    }
}

/// A page request that kept failing after its retries were used up.
#[derive(Debug, Error)]
#[error("Page {page} failed after {records_fetched} records were fetched: {source}")]
pub struct FetchError {
    /// 1-based index of the page that failed.
    pub page: usize,
    pub records_fetched: usize,
    #[source]
    pub source: UpstreamError,
}

/// Run-level failures returned by the ingestion entry points.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("No candidate view returned data (tried: {}); last error: {}", attempted.join(", "), last_error.as_deref().unwrap_or("none"))]
    Connectivity {
        attempted: Vec<String>,
        last_error: Option<String>,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Run cancelled after {pages_fetched} pages ({records_fetched} records)")]
    Cancelled {
        pages_fetched: usize,
        records_fetched: usize,
    },

    #[error("Record {record_id}: {source}")]
    Record {
        record_id: String,
        #[source]
        source: UpstreamError,
    },
}

/// A record that could not be turned into a displayable property. Counted, not raised.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRejected {
    pub record_id: String,
    pub reason: String,
}

impl std::fmt::Display for RecordRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record {} rejected: {}", self.record_id, self.reason)
    }
}
