//! Durable state management for the alert ledger.

pub mod error;
pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteStateRepository;
