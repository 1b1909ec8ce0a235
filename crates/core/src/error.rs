//! Error taxonomy for upstream calls.
//!
//! Missing fields, dangling cross-references and empty result sets are not
//! errors; they surface as `None` or empty strings on the normalized records.

use std::time::Duration;

use thiserror::Error;

/// Failure talking to the upstream service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or protocol failure.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    /// The request did not complete within the configured bound.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// Non-success HTTP status.
    #[error("API error: {status} {body}")]
    Status {
        /// HTTP status returned by the upstream.
        status: reqwest::StatusCode,
        /// Leading part of the response body, for diagnostics.
        body: String,
    },
    /// HTTP succeeded but the payload reports a failure code.
    #[error("upstream reported {code}: {status}")]
    Upstream {
        /// Numeric `code` field from the payload.
        code: i64,
        /// Human-readable `status` field from the payload.
        status: String,
    },
    /// Body was not the JSON shape we expect.
    #[error("parse error: {0}")]
    Decode(#[from] serde_json::Error),
    /// Payload decoded but held no usable record.
    #[error("{0}")]
    Missing(String),
    /// Writing a downloaded file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of one client operation; each carries the underlying cause.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Searching games by name failed.
    #[error("search failed: {0}")]
    SearchFailed(#[source] ApiError),
    /// Fetching a single game failed.
    #[error("fetching game details failed: {0}")]
    DetailsFailed(#[source] ApiError),
    /// Fetching the platform catalog failed.
    #[error("fetching platforms failed: {0}")]
    PlatformsFailed(#[source] ApiError),
    /// Downloading or saving a cover image failed.
    #[error("cover download failed: {0}")]
    CoverDownloadFailed(#[source] ApiError),
}

impl ClientError {
    /// Underlying transport or upstream cause.
    pub fn cause(&self) -> &ApiError {
        match self {
            ClientError::SearchFailed(err)
            | ClientError::DetailsFailed(err)
            | ClientError::PlatformsFailed(err)
            | ClientError::CoverDownloadFailed(err) => err,
        }
    }

    /// Whether the failure was the request timeout rather than a hard error.
    pub fn is_timeout(&self) -> bool {
        matches!(self.cause(), ApiError::Timeout(_))
    }
}
