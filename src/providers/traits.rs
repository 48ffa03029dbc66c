//! This module defines the interface for fetching match records from the
//! backing document store.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::{MatchRecord, MatchStatus};

/// Custom error type for match source operations.
///
/// A source failure is a retryable cycle failure: the caller computes no
/// alerts and tries again on the next tick.
#[derive(Error, Debug)]
pub enum MatchSourceError {
    /// Error when building the request URL.
    #[error("Failed to build source URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The request could not be sent (network/backend unavailable).
    #[error("Request to match backend failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The backend replied with an error status or an unreadable body.
    #[error("Match backend returned an error: {0}")]
    Backend(#[from] reqwest::Error),
}

/// A trait for a queryable collection of match records.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Fetches every match record in the collection.
    async fn fetch_all(&self) -> Result<Vec<MatchRecord>, MatchSourceError>;

    /// Fetches the match records whose status equals the given value.
    async fn fetch_by_status(
        &self,
        status: MatchStatus,
    ) -> Result<Vec<MatchRecord>, MatchSourceError>;
}
