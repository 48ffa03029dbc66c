//! This module defines the data structures for notification channel
//! configurations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::HttpRetryConfig;

/// Configuration for a generic webhook channel (e.g. the app's push
/// gateway).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct WebhookChannelConfig {
    /// The URL of the webhook endpoint.
    pub url: Url,

    /// The HTTP method to use (defaults to POST).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// An optional shared secret sent with each request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Optional custom headers to include in each request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    /// The retry policy configuration for HTTP requests.
    #[serde(default)]
    pub retry_policy: HttpRetryConfig,
}

/// Configuration for a channel that prints alerts to standard output.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct StdoutChannelConfig {}

/// The type-specific part of a channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelTypeConfig {
    /// A generic webhook.
    Webhook(WebhookChannelConfig),
    /// Standard output, used by dry runs and local development.
    Stdout(StdoutChannelConfig),
}

/// Error types for channel configuration validation.
#[derive(Debug, Clone, Error)]
pub enum ChannelConfigError {
    /// The channel name is empty.
    #[error("Channel name cannot be empty.")]
    EmptyName,

    /// The webhook URL uses a scheme other than http/https.
    #[error("Webhook URL must use http or https.")]
    InvalidWebhookScheme,

    /// The configured HTTP method is not a valid method token.
    #[error("Invalid HTTP method '{0}' for webhook channel.")]
    InvalidMethod(String),
}

/// A single channel configuration entry from the YAML file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChannelConfig {
    /// The unique name of the channel.
    pub name: String,

    /// The specific configuration for the channel type.
    #[serde(flatten)]
    pub config: ChannelTypeConfig,
}

impl ChannelConfig {
    /// Validates the channel configuration.
    pub fn validate(&self) -> Result<(), ChannelConfigError> {
        if self.name.trim().is_empty() {
            return Err(ChannelConfigError::EmptyName);
        }
        match &self.config {
            ChannelTypeConfig::Webhook(config) => {
                if !matches!(config.url.scheme(), "http" | "https") {
                    return Err(ChannelConfigError::InvalidWebhookScheme);
                }
                if let Some(method) = &config.method {
                    if reqwest::Method::from_bytes(method.as_bytes()).is_err() {
                        return Err(ChannelConfigError::InvalidMethod(method.clone()));
                    }
                }
                Ok(())
            }
            // Standard output requires no validation.
            ChannelTypeConfig::Stdout(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webhook_config(url: &str) -> ChannelConfig {
        ChannelConfig {
            name: "push-gateway".to_string(),
            config: ChannelTypeConfig::Webhook(WebhookChannelConfig {
                url: Url::parse(url).unwrap(),
                method: None,
                secret: None,
                headers: None,
                retry_policy: HttpRetryConfig::default(),
            }),
        }
    }

    #[test]
    fn valid_webhook_passes_validation() {
        assert!(webhook_config("https://push.example.com/v1/notify").validate().is_ok());
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let result = webhook_config("ftp://push.example.com/v1/notify").validate();
        assert!(matches!(result, Err(ChannelConfigError::InvalidWebhookScheme)));
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut config = webhook_config("https://push.example.com/v1/notify");
        config.name = "  ".to_string();
        assert!(matches!(config.validate(), Err(ChannelConfigError::EmptyName)));
    }

    #[test]
    fn invalid_method_is_rejected() {
        let mut config = webhook_config("https://push.example.com/v1/notify");
        if let ChannelTypeConfig::Webhook(webhook) = &mut config.config {
            webhook.method = Some("P OST".to_string());
        }
        assert!(matches!(config.validate(), Err(ChannelConfigError::InvalidMethod(_))));
    }

    #[test]
    fn channel_config_deserializes_from_yaml_shape() {
        let json = serde_json::json!({
            "name": "console",
            "stdout": {}
        });
        let config: ChannelConfig = serde_json::from_value(json).unwrap();
        assert!(matches!(config.config, ChannelTypeConfig::Stdout(_)));
        assert!(config.validate().is_ok());
    }
}
