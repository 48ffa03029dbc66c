//! The Supervisor module manages the lifecycle of the matchwatch service.
//!
//! It acts as the top-level owner of the major components (the match
//! source, the channel dispatcher, the monitor and the state store),
//! starts them, listens for shutdown signals and orchestrates a clean
//! shutdown.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    channels::ChannelError,
    config::AppConfig,
    engine::monitor::{MatchMonitor, MatchMonitorError},
    persistence::{error::PersistenceError, traits::KeyValueStore},
};

/// Represents the set of errors that can occur during the supervisor's
/// operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// A state store was not provided to the `SupervisorBuilder`.
    #[error("Missing state store for Supervisor")]
    MissingStateStore,

    /// A match source was not provided to the `SupervisorBuilder`.
    #[error("Missing match source for Supervisor")]
    MissingMatchSource,

    /// Channel configurations were not provided to the `SupervisorBuilder`.
    #[error("Missing channel configurations for Supervisor")]
    MissingChannels,

    /// The channel dispatcher could not be constructed.
    #[error("Channel dispatcher error: {0}")]
    ChannelInit(#[from] ChannelError),

    /// An error occurred while hydrating or running the monitor.
    #[error("Match monitor error: {0}")]
    Monitor(#[from] MatchMonitorError),

    /// An error occurred in the persistence layer.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// The primary runtime manager for the service.
///
/// Owns the monitor task; once `run` is called it becomes the main process
/// loop until a shutdown signal arrives or a critical task fails.
pub struct Supervisor<T: KeyValueStore + 'static> {
    /// Shared application configuration.
    config: Arc<AppConfig>,

    /// The persistent alert-state store.
    store: Arc<T>,

    /// The periodic match monitor.
    monitor: Arc<MatchMonitor<T>>,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: CancellationToken,

    /// A set of all spawned tasks that the supervisor is actively managing.
    join_set: tokio::task::JoinSet<()>,
}

impl<T: KeyValueStore + Send + Sync + 'static> Supervisor<T> {
    /// Creates a new Supervisor instance with all its required components.
    ///
    /// This is typically called by the `SupervisorBuilder` after it has
    /// assembled all the necessary dependencies.
    pub fn new(config: Arc<AppConfig>, store: Arc<T>, monitor: Arc<MatchMonitor<T>>) -> Self {
        Self {
            config,
            store,
            monitor,
            cancellation_token: CancellationToken::new(),
            join_set: tokio::task::JoinSet::new(),
        }
    }

    /// Returns a new `SupervisorBuilder` instance.
    pub fn builder() -> SupervisorBuilder<T> {
        SupervisorBuilder::<T>::new()
    }

    /// Starts the supervisor and all its managed services.
    ///
    /// 1. Spawns a signal handler for `SIGINT` (Ctrl+C) and `SIGTERM`.
    /// 2. Hydrates the alert ledger so deduplication survives restarts.
    /// 3. Registers the monitor's periodic cycle.
    /// 4. Waits for a shutdown signal or a failed task, then cleans up
    ///    within the configured timeout.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        let cancellation_token = self.cancellation_token.clone();

        // Spawn a task to listen for shutdown signals.
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM handler")
                    .recv()
                    .await;
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
            }

            cancellation_token.cancel();
        });

        let hydrated = self.monitor.hydrate().await?;
        tracing::info!(count = hydrated, "Alert ledger hydrated.");

        self.monitor.register(&mut self.join_set, self.cancellation_token.clone());

        // --- Main Supervisor Loop ---
        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(_)) => {
                            // Task completed cleanly, continue monitoring.
                        }
                        Some(Err(e)) => {
                            tracing::error!("A critical task failed: {:?}. Initiating shutdown.", e);
                            self.cancellation_token.cancel();
                        }
                        None => {
                            // All tasks have completed.
                            break;
                        }
                    }
                }
                _ = self.cancellation_token.cancelled() => {
                    break;
                }
            }
        }

        // --- Graceful Shutdown ---
        self.join_set.shutdown().await;
        tracing::info!("All supervised tasks have completed.");

        let shutdown_timeout = self.config.shutdown_timeout_secs;
        let cleanup_logic = async {
            if let Err(e) = self.store.flush().await {
                tracing::error!(error = %e, "Failed to flush state store, continuing shutdown.");
            }
        };

        if tokio::time::timeout(shutdown_timeout, cleanup_logic).await.is_err() {
            tracing::warn!(
                "Cleanup did not complete within the timeout of {:?}. Continuing shutdown.",
                shutdown_timeout
            );
        } else {
            tracing::info!("Cleanup completed successfully.");
        }

        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}
