//! REST implementation of the `MatchSource` trait against the document
//! store's HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

use crate::{
    models::{MatchRecord, MatchStatus},
    providers::traits::{MatchSource, MatchSourceError},
};

/// Fetches match records from the `matches` collection of the backend REST
/// API.
pub struct RestMatchSource {
    base_url: Url,
    http_client: Arc<ClientWithMiddleware>,
}

impl RestMatchSource {
    /// Creates a new source rooted at the given base URL.
    pub fn new(base_url: Url, http_client: Arc<ClientWithMiddleware>) -> Self {
        Self { base_url, http_client }
    }

    /// Builds the collection URL, optionally with a status equality filter.
    fn matches_url(&self, status: Option<MatchStatus>) -> Result<Url, MatchSourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push("matches");
        if let Some(status) = status {
            url.query_pairs_mut().append_pair("status", status.as_str());
        }
        Ok(url)
    }

    /// Fetches and decodes a batch of match documents.
    ///
    /// Documents are decoded individually: one malformed document is logged
    /// and skipped, and never fails the batch.
    async fn fetch_documents(
        &self,
        status: Option<MatchStatus>,
    ) -> Result<Vec<MatchRecord>, MatchSourceError> {
        let url = self.matches_url(status)?;
        tracing::debug!(url = %url, "Fetching match documents.");

        let response = self.http_client.get(url).send().await?.error_for_status()?;
        let documents: Vec<serde_json::Value> = response.json().await?;

        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            match serde_json::from_value::<MatchRecord>(document) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping match document that failed to decode.");
                }
            }
        }

        tracing::debug!(count = records.len(), "Fetched match records.");
        Ok(records)
    }
}

#[async_trait]
impl MatchSource for RestMatchSource {
    async fn fetch_all(&self) -> Result<Vec<MatchRecord>, MatchSourceError> {
        self.fetch_documents(None).await
    }

    async fn fetch_by_status(
        &self,
        status: MatchStatus,
    ) -> Result<Vec<MatchRecord>, MatchSourceError> {
        self.fetch_documents(Some(status)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::HttpRetryConfig, http_client::create_retryable_http_client};

    fn source(base: &str) -> RestMatchSource {
        let client = create_retryable_http_client(
            &HttpRetryConfig { max_retries: 0, ..Default::default() },
            reqwest::Client::new(),
        );
        RestMatchSource::new(Url::parse(base).unwrap(), Arc::new(client))
    }

    #[test]
    fn matches_url_appends_collection_segment() {
        let source = source("https://backend.example.com/api/");
        let url = source.matches_url(None).unwrap();
        assert_eq!(url.as_str(), "https://backend.example.com/api/matches");
    }

    #[test]
    fn matches_url_carries_status_filter() {
        let source = source("https://backend.example.com/api/");
        let url = source.matches_url(Some(MatchStatus::Scheduled)).unwrap();
        assert_eq!(url.as_str(), "https://backend.example.com/api/matches?status=scheduled");
    }

    #[tokio::test]
    async fn fetch_skips_documents_that_fail_to_decode() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!([
            {
                "id": "m-1",
                "date": "2025-06-01T18:00:00Z",
                "opponent": "Heretics",
                "competition": "LEC",
                "team": "League of Legends",
                "status": "scheduled"
            },
            { "id": "broken" }
        ]);
        let mock = server
            .mock("GET", "/matches")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let source = source(&format!("{}/", server.url()));
        let records = source.fetch_all().await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "m-1");
    }

    #[tokio::test]
    async fn fetch_by_status_sends_equality_filter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/matches?status=live")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let source = source(&format!("{}/", server.url()));
        let records = source.fetch_by_status(MatchStatus::Live).await.unwrap();

        mock.assert_async().await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn backend_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/matches").with_status(503).create_async().await;

        let source = source(&format!("{}/", server.url()));
        let result = source.fetch_all().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(MatchSourceError::Backend(_))));
    }
}
