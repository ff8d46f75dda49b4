use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The wire-level error taxonomy. Every failure that reaches a caller is
/// reported as exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    BadRequest,
    SourceUnavailable,
    BlockedOrCaptcha,
    Timeout,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::BadRequest => "bad_request",
            Self::SourceUnavailable => "source_unavailable",
            Self::BlockedOrCaptcha => "blocked_or_captcha",
            Self::Timeout => "timeout",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single page fetch through the remote gateway.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    #[error("source unavailable for {url}: {reason}")]
    SourceUnavailable { url: String, reason: String },

    #[error("anti-bot challenge served for {url} (marker {marker:?})")]
    BlockedOrCaptcha { url: String, marker: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            Self::BlockedOrCaptcha { .. } => ErrorKind::BlockedOrCaptcha,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::SourceUnavailable { url, .. }
            | Self::BlockedOrCaptcha { url, .. } => url,
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Request rejected before any work was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one non-empty query is required")]
    NoQueries,

    #[error("too many queries: {count} (max {max})")]
    TooManyQueries { count: usize, max: usize },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
