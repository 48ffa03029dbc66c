//! A channel that POSTs alerts to a configured webhook endpoint (the app's
//! push-notification gateway).

use std::sync::Arc;

use reqwest_middleware::ClientWithMiddleware;
use serde_json::json;

use crate::{
    channels::{error::ChannelError, traits::Channel},
    models::{Alert, channel::WebhookChannelConfig},
};

/// Header carrying the optional shared secret.
const SECRET_HEADER: &str = "X-Webhook-Secret";

/// Delivers alerts as JSON to a webhook endpoint.
pub struct WebhookChannel {
    config: WebhookChannelConfig,
    http_client: Arc<ClientWithMiddleware>,
}

impl WebhookChannel {
    /// Creates a new `WebhookChannel` with the given configuration and HTTP
    /// client.
    pub fn new(config: WebhookChannelConfig, http_client: Arc<ClientWithMiddleware>) -> Self {
        Self { config, http_client }
    }

    fn method(&self) -> Result<reqwest::Method, ChannelError> {
        match &self.config.method {
            Some(method) => reqwest::Method::from_bytes(method.as_bytes())
                .map_err(|_| ChannelError::Config(format!("Invalid HTTP method '{method}'"))),
            None => Ok(reqwest::Method::POST),
        }
    }
}

#[async_trait::async_trait]
impl Channel for WebhookChannel {
    async fn deliver(&self, alert: &Alert) -> Result<(), ChannelError> {
        let payload = json!({
            "title": alert.title,
            "body": alert.body,
            "dedupe_key": alert.dedupe_key,
            "priority": "high",
        });

        let mut request = self
            .http_client
            .request(self.method()?, self.config.url.clone())
            .json(&payload);

        if let Some(secret) = &self.config.secret {
            request = request.header(SECRET_HEADER, secret);
        }
        if let Some(headers) = &self.config.headers {
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        request.send().await?.error_for_status()?;
        Ok(())
    }
}
