//! The delivery interface implemented by every notification channel.

use crate::{channels::error::ChannelError, models::Alert};

/// A notification channel that can present a rendered alert.
///
/// Channels are expected to deduplicate on `Alert::dedupe_key` at the
/// presentation layer; the service itself already deduplicates emission
/// through the alert ledger.
#[async_trait::async_trait]
pub trait Channel: Send + Sync {
    /// Delivers the alert through this channel.
    async fn deliver(&self, alert: &Alert) -> Result<(), ChannelError>;
}
