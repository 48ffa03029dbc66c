//! # Channel Dispatcher
//!
//! This module delivers rendered alerts through the configured notification
//! channels. It is the service's only outward-facing side effect: alerts go
//! out, deduplicated by their integer key, and nothing is written back to
//! the record source.
//!
//! Delivery is fire-and-forget from the monitor's perspective: a channel
//! failure is logged and the remaining channels still receive the alert.

use std::{collections::HashMap, sync::Arc};

pub mod error;
mod stdout;
mod traits;
mod webhook;

pub use error::ChannelError;
pub use traits::Channel;

use crate::{
    channels::{stdout::StdoutChannel, webhook::WebhookChannel},
    http_client::HttpClientPool,
    models::{
        Alert,
        channel::{ChannelConfig, ChannelTypeConfig},
    },
};

/// Owns one `Channel` per configured name and fans each alert out to all of
/// them.
pub struct ChannelDispatcher {
    channels: HashMap<String, Box<dyn Channel>>,
}

impl ChannelDispatcher {
    /// Creates a new `ChannelDispatcher` from validated channel
    /// configurations loaded at startup.
    pub async fn new(
        channel_configs: &[ChannelConfig],
        client_pool: Arc<HttpClientPool>,
    ) -> Result<Self, ChannelError> {
        let mut channels: HashMap<String, Box<dyn Channel>> = HashMap::new();

        for config in channel_configs {
            let channel: Box<dyn Channel> = match &config.config {
                ChannelTypeConfig::Stdout(_) => Box::new(StdoutChannel::new()),
                ChannelTypeConfig::Webhook(c) => {
                    let http_client = client_pool.get_or_create(&c.retry_policy).await?;
                    Box::new(WebhookChannel::new(c.clone(), http_client))
                }
            };
            channels.insert(config.name.clone(), channel);
        }

        Ok(ChannelDispatcher { channels })
    }

    /// Number of configured channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True when no channel is configured.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Delivers an alert through every configured channel, logging failures
    /// without aborting the batch.
    pub async fn dispatch(&self, alert: &Alert) {
        for (name, channel) in &self.channels {
            if let Err(e) = channel.deliver(alert).await {
                tracing::error!(
                    channel = %name,
                    match_id = %alert.match_id,
                    error = %e,
                    "Failed to deliver alert."
                );
            } else {
                tracing::debug!(channel = %name, match_id = %alert.match_id, "Alert delivered.");
            }
        }
    }
}
