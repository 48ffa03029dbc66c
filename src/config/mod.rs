//! Configuration module for matchwatch.

mod app_config;
mod channel_loader;
mod helpers;
mod http_retry;

pub use app_config::AppConfig;
pub use channel_loader::{ChannelLoader, ChannelLoaderError};
pub use helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, serialize_duration_to_ms,
    serialize_duration_to_seconds,
};
pub use http_retry::{HttpRetryConfig, JitterSetting};
