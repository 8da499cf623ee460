//! Configuration types for batch-fetch

use crate::error::{Error, Result};
use crate::resource::UrlTemplate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// What a batch extracts from each response and how results are combined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Download every body and return them in request order
    #[default]
    Bodies,
    /// Sum the declared content lengths (missing length counts as zero)
    TotalLength,
}

/// Main configuration for [`BatchFetcher`](crate::BatchFetcher)
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// URL template with an `{id}` placeholder
    /// (default: "http://localhost:8888/resource/{id}")
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Resource identifiers fetched when none are given on the command line
    /// (default: ["1", "2", "3"])
    #[serde(default = "default_resource_ids")]
    pub resource_ids: Vec<String>,

    /// Deadline shared by the whole batch, in milliseconds (default: 1000)
    #[serde(default = "default_deadline", with = "duration_millis_serde")]
    pub deadline: Duration,

    /// Aggregation mode (default: bodies)
    #[serde(default)]
    pub mode: FetchMode,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Capacity of the event broadcast channel (default: 256)
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            resource_ids: default_resource_ids(),
            deadline: default_deadline(),
            mode: FetchMode::default(),
            user_agent: default_user_agent(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    ///
    /// Missing fields take their defaults. The result is validated before it is returned.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Check that the configuration can drive a batch
    pub fn validate(&self) -> Result<()> {
        UrlTemplate::parse(&self.url_template)?;

        if self.deadline.is_zero() {
            return Err(Error::Config {
                message: "deadline must be greater than zero".to_string(),
                key: Some("deadline".to_string()),
            });
        }

        if self.event_channel_capacity == 0 {
            return Err(Error::Config {
                message: "event_channel_capacity must be at least 1".to_string(),
                key: Some("event_channel_capacity".to_string()),
            });
        }

        Ok(())
    }

    /// Parsed form of [`Config::url_template`]
    pub fn template(&self) -> Result<UrlTemplate> {
        UrlTemplate::parse(&self.url_template)
    }
}

fn default_url_template() -> String {
    "http://localhost:8888/resource/{id}".to_string()
}

fn default_resource_ids() -> Vec<String> {
    vec!["1".to_string(), "2".to_string(), "3".to_string()]
}

fn default_deadline() -> Duration {
    Duration::from_millis(1000)
}

fn default_user_agent() -> String {
    format!("batch-fetch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_event_channel_capacity() -> usize {
    256
}

// Duration serialization helper (whole milliseconds)
mod duration_millis_serde {
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
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
