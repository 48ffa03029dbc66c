//! Retry policy configuration for outbound HTTP requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, serialize_duration_to_ms,
    serialize_duration_to_seconds,
};

fn default_max_retries() -> u32 {
    3
}

fn default_base_for_backoff() -> u32 {
    2
}

fn default_initial_backoff_ms() -> Duration {
    Duration::from_millis(250)
}

fn default_max_backoff_secs() -> Duration {
    Duration::from_secs(10)
}

/// Serializable setting for jitter in retry policies.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JitterSetting {
    /// No jitter applied to the backoff duration.
    None,
    /// Full jitter applied, randomizing the backoff duration.
    #[default]
    Full,
}

/// Configuration for HTTP retry policies (record-source fetches and webhook
/// deliveries).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HttpRetryConfig {
    /// Maximum number of retries for transient errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base for the exponential backoff calculation.
    #[serde(default = "default_base_for_backoff")]
    pub base_for_backoff: u32,

    /// Initial backoff duration before the first retry.
    #[serde(
        default = "default_initial_backoff_ms",
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub initial_backoff_ms: Duration,

    /// Maximum backoff duration between retries.
    #[serde(
        default = "default_max_backoff_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub max_backoff_secs: Duration,

    /// Jitter to apply to the backoff duration.
    #[serde(default)]
    pub jitter: JitterSetting,
}

impl Default for HttpRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_for_backoff: default_base_for_backoff(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
            jitter: JitterSetting::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_partial_config() {
        let config: HttpRetryConfig =
            serde_json::from_str(r#"{"max_retries": 5}"#).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_backoff_ms, Duration::from_millis(250));
        assert_eq!(config.max_backoff_secs, Duration::from_secs(10));
        assert_eq!(config.jitter, JitterSetting::Full);
    }

    #[test]
    fn jitter_deserializes_lowercase() {
        let config: HttpRetryConfig =
            serde_json::from_str(r#"{"jitter": "none"}"#).unwrap();
        assert_eq!(config.jitter, JitterSetting::None);
    }
}
