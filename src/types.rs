//! Core types for batch-fetch

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// One resource of a batch, resolved to its target URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRequest {
    /// Position of the resource in the input sequence
    pub index: usize,
    /// The caller-supplied identifier
    pub id: String,
    /// URL the identifier resolved to
    pub url: Url,
}

/// Result reported by one fetch task
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// The resource was fetched and its payload extracted
    Succeeded {
        /// Position of the resource in the input sequence
        index: usize,
        /// Extracted payload
        payload: T,
    },
    /// The resource could not be fetched
    Failed(FetchError),
}

/// How a batch call ended
///
/// Exactly one terminal state is reached. Whichever condition is observed
/// first wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// Every resource succeeded before the deadline
    Completed,
    /// A resource failed with a non-cancellation error
    Failed,
    /// The deadline elapsed first
    TimedOut,
}

/// Events emitted while a batch runs
///
/// Subscribe with [`BatchFetcher::subscribe`](crate::BatchFetcher::subscribe).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchEvent {
    /// A batch was started
    BatchStarted {
        /// Operation name ("fetch_bodies", "fetch_total_length", ...)
        operation: String,
        /// Number of resources in the batch
        total: usize,
        /// Deadline shared by the batch
        #[serde(with = "duration_millis")]
        deadline: Duration,
    },

    /// One resource finished successfully
    ResourceFetched {
        /// Position of the resource in the input sequence
        index: usize,
        /// Resource identifier
        id: String,
    },

    /// Every resource succeeded
    BatchCompleted {
        /// Operation name
        operation: String,
        /// Number of resources in the batch
        total: usize,
        /// Time from start to completion
        #[serde(with = "duration_millis")]
        elapsed: Duration,
    },

    /// A resource failed and the batch was abandoned
    BatchFailed {
        /// Operation name
        operation: String,
        /// Error message
        error: String,
    },

    /// The deadline elapsed and the batch was abandoned
    BatchTimedOut {
        /// Operation name
        operation: String,
        /// Resources that had finished when the deadline fired
        completed: usize,
        /// Number of resources in the batch
        total: usize,
    },
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
