//! Performs a single evaluation pass and prints the would-be alerts
//! without dispatching or persisting anything.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Parser;
use thiserror::Error;

use crate::{
    config::AppConfig,
    engine::evaluator::{AlertLedger, evaluate},
    http_client::create_retryable_http_client,
    models::MatchStatus,
    providers::{
        rest::RestMatchSource,
        traits::{MatchSource, MatchSourceError},
    },
};

/// Errors that can occur during a dry run.
#[derive(Error, Debug)]
pub enum DryRunError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// The `--at` timestamp is not valid RFC 3339.
    #[error("Invalid --at timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    /// The `--status` filter is not a known status.
    #[error("Invalid --status filter: {0}")]
    InvalidStatus(String),

    /// The match record fetch failed.
    #[error("Match source error: {0}")]
    Source(#[from] MatchSourceError),

    /// The alerts could not be serialized for printing.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arguments for the dry-run subcommand.
#[derive(Parser, Debug)]
pub struct DryRunArgs {
    /// Evaluate as if the current time were this RFC 3339 timestamp.
    #[arg(long)]
    at: Option<String>,

    /// Only evaluate records with this lifecycle status
    /// (scheduled | live | finished).
    #[arg(long)]
    status: Option<String>,
}

/// Executes the dry run: fetch once, evaluate against a fresh ledger, print
/// the due alerts as JSON.
pub async fn execute(args: DryRunArgs) -> Result<(), DryRunError> {
    let config = AppConfig::new(None)?;

    let http_client =
        create_retryable_http_client(&config.http_retry_config, reqwest::Client::new());
    let source = RestMatchSource::new(config.source_url.clone(), Arc::new(http_client));

    let records = match &args.status {
        Some(raw) => {
            let status: MatchStatus = raw.parse().map_err(DryRunError::InvalidStatus)?;
            source.fetch_by_status(status).await?
        }
        None => source.fetch_all().await?,
    };

    let now = match &args.at {
        Some(raw) => DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc),
        None => Utc::now(),
    };

    // A throwaway ledger: a dry run never consults or touches persisted
    // deduplication state.
    let mut ledger = AlertLedger::new();
    let evaluation = evaluate(now, &records, &mut ledger, &config.team_name);

    tracing::info!(
        records = records.len(),
        due = evaluation.alerts.len(),
        "Dry run evaluated match snapshot."
    );
    println!("{}", serde_json::to_string_pretty(&evaluation.alerts)?);

    Ok(())
}
