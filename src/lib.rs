#![warn(missing_docs)]
//! Matchwatch watches an esports team's match schedule and dispatches
//! deduplicated match alerts (upcoming, live, late) through configurable
//! notification channels.

pub mod channels;
pub mod cmd;
pub mod config;
pub mod engine;
pub mod http_client;
pub mod models;
pub mod persistence;
pub mod providers;
pub mod supervisor;
pub mod test_helpers;
