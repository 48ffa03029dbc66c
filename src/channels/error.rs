//! Error types for alert delivery.

use thiserror::Error;

use crate::http_client::HttpClientPoolError;

/// Errors that can occur while building channels or delivering alerts.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A channel was misconfigured.
    #[error("Invalid channel configuration: {0}")]
    Config(String),

    /// The delivery request could not be sent.
    #[error("Delivery transport error: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The receiving endpoint rejected the delivery.
    #[error("Delivery rejected: {0}")]
    Rejected(#[from] reqwest::Error),

    /// The alert payload could not be serialized.
    #[error("Failed to serialize alert payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The shared HTTP client could not be created.
    #[error("HTTP client pool error: {0}")]
    ClientPool(#[from] HttpClientPoolError),
}
