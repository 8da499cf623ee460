//! Error types for batch-fetch
//!
//! This module provides the error handling for the library, including:
//! - The crate-wide [`Error`] type and [`Result`] alias
//! - Per-resource failures ([`FetchError`]) reported by individual fetch tasks
//! - Machine-readable error codes and a serializable [`ErrorReport`]

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for batch-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for batch-fetch
///
/// A timeout is its own variant so callers can tell "the batch ran out of time"
/// apart from "a resource could not be fetched".
#[derive(Debug, Error)]
pub enum Error {
    /// The batch deadline elapsed before every resource finished
    #[error(
        "{operation} didn't complete within {}s and was cancelled ({completed}/{total} resources finished)",
        .deadline.as_secs_f64()
    )]
    Timeout {
        /// The batch operation that timed out (e.g. "fetch_bodies")
        operation: &'static str,
        /// The deadline the batch was given
        deadline: Duration,
        /// Number of resources that had completed when the deadline fired
        completed: usize,
        /// Number of resources in the batch
        total: usize,
    },

    /// A single resource failed, aborting the whole batch
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A required argument or collaborator was not supplied
    #[error("missing argument: {name}")]
    MissingArgument {
        /// Name of the missing argument
        name: &'static str,
    },

    /// An argument was supplied but is not acceptable
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A lookup by identifier yielded nothing
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "url_template")
        key: Option<String>,
    },

    /// A resource URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// A fetch task panicked or was aborted unexpectedly
    #[error("fetch task failed: {0}")]
    TaskFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single resource fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read
    #[error("request for resource {index} ({url}) failed: {source}")]
    Request {
        /// Position of the resource in the batch
        index: usize,
        /// Resolved resource URL
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("resource {index} ({url}) returned HTTP {status}")]
    Status {
        /// Position of the resource in the batch
        index: usize,
        /// Resolved resource URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The batch deadline fired while this resource was in flight
    #[error("resource {index} ({url}) was cancelled")]
    Cancelled {
        /// Position of the resource in the batch
        index: usize,
        /// Resolved resource URL
        url: String,
    },
}

impl FetchError {
    /// Position of the failed resource in the batch
    pub fn index(&self) -> usize {
        match self {
            FetchError::Request { index, .. }
            | FetchError::Status { index, .. }
            | FetchError::Cancelled { index, .. } => *index,
        }
    }

    /// Resolved URL of the failed resource
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Cancelled { url, .. } => url,
        }
    }

    /// Returns true if the failure was caused by the batch deadline
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled { .. })
    }
}

impl Error {
    /// Returns true if the batch deadline elapsed
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Get the machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Timeout { .. } => "timeout",
            Error::Fetch(e) => match e {
                FetchError::Request { .. } => "request_failed",
                FetchError::Status { .. } => "bad_status",
                FetchError::Cancelled { .. } => "cancelled",
            },
            Error::MissingArgument { .. } => "missing_argument",
            Error::InvalidArgument { .. } => "invalid_argument",
            Error::NotFound(_) => "not_found",
            Error::Config { .. } => "config_error",
            Error::InvalidUrl(_) => "invalid_url",
            Error::Client(_) => "client_error",
            Error::TaskFailed(_) => "task_failed",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// Process exit code used by the command line front end
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Timeout { .. } => 2,
            Error::MissingArgument { .. } | Error::InvalidArgument { .. } | Error::Config { .. } => 3,
            _ => 1,
        }
    }
}

/// Serializable error report
///
/// # Example JSON
///
/// ```json
/// {
///   "code": "timeout",
///   "message": "fetch_bodies didn't complete within 1s and was cancelled (1/3 resources finished)",
///   "details": { "operation": "fetch_bodies", "deadline_ms": 1000, "completed": 1, "total": 3 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable error code (e.g., "timeout", "bad_status")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for ErrorReport {
    fn from(error: &Error) -> Self {
        let details = match error {
            Error::Timeout {
                operation,
                deadline,
                completed,
                total,
            } => Some(serde_json::json!({
                "operation": operation,
                "deadline_ms": deadline.as_millis() as u64,
                "completed": completed,
                "total": total,
            })),
            Error::Fetch(FetchError::Status { index, url, status }) => Some(serde_json::json!({
                "index": index,
                "url": url,
                "status": status,
            })),
            Error::Fetch(e) => Some(serde_json::json!({
                "index": e.index(),
                "url": e.url(),
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}
