//! Implementation of the `KeyValueStore` trait for `SqliteStateRepository`.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::Row;

use crate::persistence::{
    error::PersistenceError, sqlite::SqliteStateRepository, traits::KeyValueStore,
};

#[async_trait]
impl KeyValueStore for SqliteStateRepository {
    async fn get_json_state<T: DeserializeOwned + Send + Sync + 'static>(
        &self,
        key: &str,
    ) -> Result<Option<T>, PersistenceError> {
        let row = self
            .execute_query_with_error_handling(
                "get JSON state",
                sqlx::query("SELECT value FROM application_state WHERE key = ?")
                    .bind(key)
                    .fetch_optional(self.pool()),
            )
            .await?;

        match row {
            Some(record) => {
                let value_str: String = record
                    .try_get("value")
                    .map_err(|e| PersistenceError::OperationFailed(e.to_string()))?;
                serde_json::from_str(&value_str)
                    .map(Some)
                    .map_err(|e| PersistenceError::SerializationError(e.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn set_json_state<T: Serialize + Send + Sync + 'static>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let value_str = serde_json::to_string(value)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

        self.execute_query_with_error_handling(
            "set JSON state",
            sqlx::query("INSERT OR REPLACE INTO application_state (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(value_str)
                .execute(self.pool()),
        )
        .await?;

        Ok(())
    }

    async fn delete_json_state(&self, key: &str) -> Result<(), PersistenceError> {
        self.execute_query_with_error_handling(
            "delete JSON state",
            sqlx::query("DELETE FROM application_state WHERE key = ?")
                .bind(key)
                .execute(self.pool()),
        )
        .await?;

        Ok(())
    }

    async fn get_all_json_states_by_prefix<T: DeserializeOwned + Send + Sync + 'static>(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, T)>, PersistenceError> {
        let like_prefix = format!("{}%", prefix);
        let rows = self
            .execute_query_with_error_handling(
                "get all JSON states by prefix",
                sqlx::query("SELECT key, value FROM application_state WHERE key LIKE ?")
                    .bind(like_prefix)
                    .fetch_all(self.pool()),
            )
            .await?;

        let mut states = Vec::new();
        for row in rows {
            let key: String = row
                .try_get("key")
                .map_err(|e| PersistenceError::OperationFailed(e.to_string()))?;
            let value_str: String = row
                .try_get("value")
                .map_err(|e| PersistenceError::OperationFailed(e.to_string()))?;
            match serde_json::from_str(&value_str) {
                Ok(value) => states.push((key, value)),
                Err(e) => {
                    // A corrupt row must not take down the whole scan.
                    tracing::error!(key, error = %e, "Failed to decode JSON state.");
                }
            }
        }

        Ok(states)
    }

    async fn flush(&self) -> Result<(), PersistenceError> {
        self.execute_query_with_error_handling(
            "flush WAL",
            sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)").execute(self.pool()),
        )
        .await?;
        Ok(())
    }
}
