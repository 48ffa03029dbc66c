//! Top-level application configuration.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{deserialize_duration_from_seconds, HttpRetryConfig};

/// Provides the default value for team_name.
fn default_team_name() -> String {
    "KOI".to_string()
}

/// Provides the default value for poll_interval_secs (15 minutes).
fn default_poll_interval() -> Duration {
    Duration::from_secs(15 * 60)
}

/// Provides the default value for poll_flex_secs (5 minutes).
fn default_poll_flex() -> Duration {
    Duration::from_secs(5 * 60)
}

/// Provides the default value for shutdown_timeout_secs.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Application configuration for matchwatch.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Database URL for the SQLite alert-state store.
    pub database_url: String,

    /// Base URL of the match record source (the document-store REST API).
    pub source_url: Url,

    /// Name of the organisation's team, used when rendering alerts.
    #[serde(default = "default_team_name")]
    pub team_name: String,

    /// The interval between evaluation cycles.
    #[serde(
        default = "default_poll_interval",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub poll_interval_secs: Duration,

    /// The flex window inside which the first cycle may start, so ticks do
    /// not align to process launch.
    #[serde(default = "default_poll_flex", deserialize_with = "deserialize_duration_from_seconds")]
    pub poll_flex_secs: Duration,

    /// The maximum time to wait for graceful shutdown.
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub shutdown_timeout_secs: Duration,

    /// Retry policy for outbound HTTP requests.
    #[serde(default)]
    pub http_retry_config: HttpRetryConfig,

    /// Path to the channel configuration file.
    #[serde(skip_deserializing)]
    pub channel_config_path: PathBuf,
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory.
    ///
    /// Values from `{config_dir}/app.yaml` can be overridden with
    /// `MATCHWATCH__`-prefixed environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("MATCHWATCH").separator("__"))
            .build()?;
        let mut config: Self = s.try_deserialize()?;

        // Channel definitions live next to app.yaml.
        config.channel_config_path = Path::new(config_dir_str).join("channels.yaml");

        Ok(config)
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    #[cfg(test)]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl Default for AppConfigBuilder {
    fn default() -> Self {
        Self {
            config: AppConfig {
                database_url: "sqlite::memory:".to_string(),
                source_url: Url::parse("http://localhost:8080/api/").expect("static url"),
                team_name: default_team_name(),
                poll_interval_secs: default_poll_interval(),
                poll_flex_secs: default_poll_flex(),
                shutdown_timeout_secs: default_shutdown_timeout(),
                http_retry_config: HttpRetryConfig::default(),
                channel_config_path: PathBuf::from("configs/channels.yaml"),
            },
        }
    }
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn database_url(mut self, url: &str) -> Self {
        self.config.database_url = url.to_string();
        self
    }

    pub fn source_url(mut self, url: Url) -> Self {
        self.config.source_url = url;
        self
    }

    pub fn team_name(mut self, name: &str) -> Self {
        self.config.team_name = name.to_string();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_secs = interval;
        self
    }

    pub fn poll_flex(mut self, flex: Duration) -> Self {
        self.config.poll_flex_secs = flex;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
