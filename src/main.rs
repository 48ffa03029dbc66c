use std::sync::Arc;

use clap::{Parser, Subcommand};
use matchwatch::{
    cmd::{DryRunArgs, dry_run},
    config::{AppConfig, ChannelLoader},
    http_client::create_retryable_http_client,
    persistence::sqlite::SqliteStateRepository,
    providers::rest::RestMatchSource,
    supervisor::Supervisor,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the match monitoring supervisor.
    Run,
    /// Performs a single evaluation pass and prints the due alerts without
    /// dispatching them.
    DryRun(DryRunArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_supervisor().await?,
        Commands::DryRun(args) => dry_run::execute(args).await?,
    }

    Ok(())
}

async fn run_supervisor() -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(None)?;
    tracing::debug!(
        database_url = %config.database_url,
        source_url = %config.source_url,
        team_name = %config.team_name,
        "Configuration loaded."
    );

    tracing::debug!("Initializing state store...");
    let store = Arc::new(SqliteStateRepository::new(&config.database_url).await?);
    store.run_migrations().await?;
    tracing::info!("Database migrations completed.");

    let channels = ChannelLoader::new(config.channel_config_path.clone()).load()?;
    tracing::info!(count = channels.len(), "Channel configurations loaded.");

    let http_client =
        create_retryable_http_client(&config.http_retry_config, reqwest::Client::new());
    let source = RestMatchSource::new(config.source_url.clone(), Arc::new(http_client));
    tracing::info!(retry_policy = ?config.http_retry_config, "Match source initialized with retry policy.");

    let supervisor = Supervisor::builder()
        .config(config)
        .store(Arc::clone(&store))
        .source(Box::new(source))
        .channels(channels)
        .build()
        .await?;

    tracing::info!("Supervisor initialized, starting match monitoring...");
    supervisor.run().await?;

    store.close().await;
    Ok(())
}
