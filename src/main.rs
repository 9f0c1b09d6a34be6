use api_client::RestSourceClient;
use clap::{Parser, Subcommand};
use database::{connect, run_migrations, CountryRepository};
use engine::RefreshService;
use std::sync::Arc;
use tracing::info;

/// A service that reconciles country reference data with currency exchange
/// rates and serves the result over HTTP.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Serve {
        /// Override the configured port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run a single refresh pass against the store and exit.
    Refresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from the .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = configuration::load_settings()?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            web_server::run_from_settings(settings).await
        }
        Commands::Refresh => handle_refresh(settings).await,
    }
}

/// Handles the one-shot refresh command: wire the stack, run one pass,
/// report the outcome.
async fn handle_refresh(settings: configuration::Settings) -> anyhow::Result<()> {
    let pool = connect(&settings.database).await?;
    run_migrations(&pool).await?;
    let repository = CountryRepository::new(pool);

    let source_client = Arc::new(RestSourceClient::new(&settings.sources));
    let service = RefreshService::new(source_client, repository);

    let summary = service.refresh().await?;
    info!(
        inserted = summary.inserted,
        updated = summary.updated,
        "Refresh complete"
    );
    println!(
        "Refreshed at {} ({} inserted, {} updated)",
        summary.refreshed_at.to_rfc3339(),
        summary.inserted,
        summary.updated
    );

    Ok(())
}
