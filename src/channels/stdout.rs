//! A channel that prints alerts to standard output.

use crate::{
    channels::{error::ChannelError, traits::Channel},
    models::Alert,
};

/// Prints each alert to standard output. Used by dry runs and local
/// development.
pub struct StdoutChannel;

impl StdoutChannel {
    /// Creates a new `StdoutChannel`.
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Channel for StdoutChannel {
    async fn deliver(&self, alert: &Alert) -> Result<(), ChannelError> {
        println!("=== Alert [{}] ===\n{}\n{}\n", alert.dedupe_key, alert.title, alert.body);
        Ok(())
    }
}
