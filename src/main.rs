use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bujo_api::config::{self, StoreBackend};
use bujo_api::database::DatabaseManager;
use bujo_api::services::UserService;
use bujo_api::{app, is_production, AppState};

#[derive(Parser, Debug)]
#[command(name = "bujo-api")]
#[command(about = "BuJo API - bullet journal backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Address to bind (overrides HOST)")]
        host: Option<String>,
        #[arg(long, help = "Port to bind (overrides PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Create a user and print its token")]
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JOURNAL_STORE, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bujo_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => serve(host, port).await,
        Command::CreateUser { username, password } => create_user(&username, &password).await,
    }
}

async fn serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    // Initialize configuration (this loads the config singleton)
    let mut config = config::config().clone();
    tracing::info!("Starting BuJo API in {:?} mode", config.environment);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if is_production!() && config.database.backend == StoreBackend::Memory {
        tracing::warn!("Production mode with the in-memory store; nothing will be persisted");
    }

    let store = DatabaseManager::open_store(&config.database)
        .await
        .context("failed to open journal store")?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("BuJo API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn create_user(username: &str, password: &str) -> anyhow::Result<()> {
    let store = DatabaseManager::open_store(&config::config().database)
        .await
        .context("failed to open journal store")?;

    let (user, token) = UserService::new(store)
        .create_user(username, password)
        .await
        .with_context(|| format!("failed to create user '{}'", username))?;

    tracing::info!("Created user '{}' (id {})", user.username, user.id);
    println!("{}", token.key);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
