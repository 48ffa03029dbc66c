//! Builder for `ChannelConfig` test fixtures.

use url::Url;

use crate::{
    config::HttpRetryConfig,
    models::channel::{
        ChannelConfig, ChannelTypeConfig, StdoutChannelConfig, WebhookChannelConfig,
    },
};

/// A fluent builder for channel configurations.
pub struct ChannelBuilder {
    name: String,
    config: ChannelTypeConfig,
}

impl ChannelBuilder {
    /// Creates a builder for a stdout channel with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            config: ChannelTypeConfig::Stdout(StdoutChannelConfig::default()),
        }
    }

    /// Turns the channel into a webhook channel pointing at the given URL.
    /// Retries are disabled so tests fail fast.
    pub fn webhook(mut self, url: &str) -> Self {
        self.config = ChannelTypeConfig::Webhook(WebhookChannelConfig {
            url: Url::parse(url).expect("invalid webhook url in test"),
            method: None,
            secret: None,
            headers: None,
            retry_policy: HttpRetryConfig { max_retries: 0, ..Default::default() },
        });
        self
    }

    /// Sets the shared secret on a webhook channel.
    pub fn secret(mut self, secret: &str) -> Self {
        if let ChannelTypeConfig::Webhook(config) = &mut self.config {
            config.secret = Some(secret.to_string());
        }
        self
    }

    /// Builds the channel configuration.
    pub fn build(self) -> ChannelConfig {
        ChannelConfig { name: self.name, config: self.config }
    }
}
