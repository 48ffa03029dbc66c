//! This module provides the `SupervisorBuilder` for constructing a
//! `Supervisor`.

use std::sync::Arc;

use crate::{
    channels::ChannelDispatcher,
    config::AppConfig,
    engine::monitor::MatchMonitor,
    http_client::HttpClientPool,
    models::channel::ChannelConfig,
    persistence::traits::KeyValueStore,
    providers::traits::MatchSource,
};

use super::{Supervisor, SupervisorError};

/// A builder for creating a `Supervisor` instance.
pub struct SupervisorBuilder<T: KeyValueStore> {
    config: Option<AppConfig>,
    store: Option<Arc<T>>,
    source: Option<Box<dyn MatchSource>>,
    channels: Option<Vec<ChannelConfig>>,
}

impl<T: KeyValueStore + Send + Sync + 'static> SupervisorBuilder<T> {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self { config: None, store: None, source: None, channels: None }
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the alert-state store for the `Supervisor`.
    pub fn store(mut self, store: Arc<T>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the match record source for the `Supervisor`.
    pub fn source(mut self, source: Box<dyn MatchSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the validated channel configurations for the `Supervisor`.
    pub fn channels(mut self, channels: Vec<ChannelConfig>) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Assembles and validates the components to build a `Supervisor`.
    ///
    /// Constructs the channel dispatcher and the match monitor, wiring in
    /// the shared HTTP client pool.
    pub async fn build(self) -> Result<Supervisor<T>, SupervisorError> {
        let config = Arc::new(self.config.ok_or(SupervisorError::MissingConfig)?);
        let store = self.store.ok_or(SupervisorError::MissingStateStore)?;
        let source = self.source.ok_or(SupervisorError::MissingMatchSource)?;
        let channels = self.channels.ok_or(SupervisorError::MissingChannels)?;

        let client_pool = Arc::new(HttpClientPool::new());
        let dispatcher = Arc::new(ChannelDispatcher::new(&channels, client_pool).await?);
        tracing::info!(count = dispatcher.len(), "Notification channels initialized.");

        let monitor = Arc::new(MatchMonitor::new(
            Arc::clone(&config),
            Arc::from(source),
            dispatcher,
            Arc::clone(&store),
        ));

        Ok(Supervisor::new(config, store, monitor))
    }
}

impl<T: KeyValueStore + Send + Sync + 'static> Default for SupervisorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
