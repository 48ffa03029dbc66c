//! This module provides a concrete implementation of the `KeyValueStore`
//! using SQLite.

use std::str::FromStr;

use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

mod key_value_store;

use crate::persistence::error::PersistenceError;

/// A SQLite-backed state repository.
pub struct SqliteStateRepository {
    /// The SQLite connection pool used for database operations.
    pool: SqlitePool,
}

impl SqliteStateRepository {
    /// Creates a new instance with the provided database URL. This will
    /// create the database file if it does not exist.
    pub async fn new(database_url: &str) -> Result<Self, PersistenceError> {
        tracing::debug!(database_url, "Attempting to connect to SQLite database.");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| PersistenceError::InvalidInput(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            PersistenceError::OperationFailed(format!("Failed to connect to database: {}", e))
        })?;
        tracing::info!(database_url, "Connected to SQLite database.");
        Ok(Self { pool })
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations.");
            PersistenceError::MigrationError(e.to_string())
        })?;
        tracing::info!("Database migrations completed.");
        Ok(())
    }

    /// Gets access to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool gracefully.
    pub async fn close(&self) {
        tracing::debug!("Closing SQLite connection pool.");
        self.pool.close().await;
    }

    /// Helper to execute database queries with consistent error handling.
    pub(crate) async fn execute_query_with_error_handling<F, T, E>(
        &self,
        operation: &str,
        query_fn: F,
    ) -> Result<T, PersistenceError>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: std::error::Error,
    {
        query_fn.await.map_err(|e| {
            tracing::error!(error = %e, operation = %operation, "Database operation failed.");
            PersistenceError::OperationFailed(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::persistence::traits::KeyValueStore;

    async fn setup_test_db() -> SqliteStateRepository {
        let repo = SqliteStateRepository::new("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory db");
        repo.run_migrations().await.expect("Failed to run migrations");
        repo
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
    struct TestJsonState {
        id: u32,
        message: String,
    }

    #[tokio::test]
    async fn test_json_state_persistence() {
        let repo = setup_test_db().await;
        let key = "test_generic_state";

        // Initially, should be None
        let retrieved: Option<TestJsonState> = repo.get_json_state(key).await.unwrap();
        assert!(retrieved.is_none());

        // Set a state
        let original = TestJsonState { id: 1, message: "Hello".to_string() };
        repo.set_json_state(key, &original).await.unwrap();

        let retrieved: Option<TestJsonState> = repo.get_json_state(key).await.unwrap();
        assert_eq!(retrieved, Some(original.clone()));

        // Update it
        let updated = TestJsonState { id: 1, message: "Updated".to_string() };
        repo.set_json_state(key, &updated).await.unwrap();

        let retrieved: Option<TestJsonState> = repo.get_json_state(key).await.unwrap();
        assert_eq!(retrieved, Some(updated));

        // A different key is still None
        let missing: Option<TestJsonState> = repo.get_json_state("missing").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_json_state_is_idempotent() {
        let repo = setup_test_db().await;
        let key = "doomed";

        repo.set_json_state(key, &TestJsonState { id: 7, message: "bye".to_string() })
            .await
            .unwrap();
        repo.delete_json_state(key).await.unwrap();

        let retrieved: Option<TestJsonState> = repo.get_json_state(key).await.unwrap();
        assert!(retrieved.is_none());

        // Deleting again must not fail.
        repo.delete_json_state(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_prefix_scan_returns_only_matching_keys() {
        let repo = setup_test_db().await;

        for (key, id) in [("alert_state:m1", 1), ("alert_state:m2", 2), ("other:m3", 3)] {
            repo.set_json_state(key, &TestJsonState { id, message: String::new() })
                .await
                .unwrap();
        }

        let mut states: Vec<(String, TestJsonState)> =
            repo.get_all_json_states_by_prefix("alert_state:").await.unwrap();
        states.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(states.len(), 2);
        assert_eq!(states[0].0, "alert_state:m1");
        assert_eq!(states[1].0, "alert_state:m2");
    }

    #[tokio::test]
    async fn test_flush_succeeds_on_fresh_store() {
        let repo = setup_test_db().await;
        repo.flush().await.unwrap();
    }
}
