use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use family_finance_api::config::{self, AppConfig};
use family_finance_api::database::DatabaseManager;
use family_finance_api::{app, AppState};

#[derive(Parser)]
#[command(name = "family-finance-api")]
#[command(about = "Family Finance API - household expenses, savings, goals and shared tasks")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Do not apply database migrations at startup")]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    // Initialize configuration (this loads the config singleton)
    let mut settings: AppConfig = config::config().clone();
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    settings.validate().context("invalid configuration")?;
    tracing::info!("Starting Family Finance API in {:?} mode", settings.environment);

    let run_migrations = settings.database.run_migrations && !cli.skip_migrations;
    let store = DatabaseManager::open(&settings, run_migrations)
        .await
        .context("failed to open document store")?;
    tracing::info!("Using {} store", store.backend());

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Family Finance API listening on http://{}", bind_addr);

    let router = app(AppState::new(settings, store));
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
