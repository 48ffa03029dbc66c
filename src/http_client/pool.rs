//! A thread-safe pool of retryable HTTP clients, keyed by retry policy.

use std::{collections::HashMap, sync::Arc};

use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;
use tokio::sync::RwLock;

use super::create_retryable_http_client;
use crate::config::HttpRetryConfig;

/// Errors that can occur within the `HttpClientPool`.
#[derive(Debug, Error)]
pub enum HttpClientPoolError {
    /// An error occurred while building the underlying `reqwest::Client`.
    #[error("Failed to create HTTP client: {0}")]
    HttpClientBuildError(String),
}

/// A pool that hands out one shared client per retry policy, so channels
/// with the same policy reuse connections.
#[derive(Default)]
pub struct HttpClientPool {
    clients: Arc<RwLock<HashMap<HttpRetryConfig, Arc<ClientWithMiddleware>>>>,
}

impl HttpClientPool {
    /// Creates a new, empty `HttpClientPool`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets an existing HTTP client from the pool or creates a new one for
    /// the given retry policy.
    pub async fn get_or_create(
        &self,
        retry_policy: &HttpRetryConfig,
    ) -> Result<Arc<ClientWithMiddleware>, HttpClientPoolError> {
        // Fast path with a read lock.
        if let Some(client) = self.clients.read().await.get(retry_policy) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        // Another task may have created the client while we waited.
        if let Some(client) = clients.get(retry_policy) {
            return Ok(client.clone());
        }

        let base_client = reqwest::Client::builder()
            .build()
            .map_err(|e| HttpClientPoolError::HttpClientBuildError(e.to_string()))?;
        let client = Arc::new(create_retryable_http_client(retry_policy, base_client));
        clients.insert(retry_policy.clone(), client.clone());

        Ok(client)
    }
}
