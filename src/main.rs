use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use services_api::config;
use services_api::database::{DatabaseManager, PgServiceStore, ServiceRepository};
use services_api::routes::{app, AppState};

#[derive(Parser)]
#[command(name = "services-api")]
#[command(about = "JSON API for managing services")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Apply pending migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("services_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve {
        port: None,
        migrate: false,
    });

    match command {
        Commands::Migrate => {
            let manager = DatabaseManager::connect(&config::config().database).await?;
            manager.migrate().await?;
            manager.close().await;
            Ok(())
        }
        Commands::Serve { port, migrate } => serve(port, migrate).await,
    }
}

async fn serve(port: Option<u16>, migrate: bool) -> anyhow::Result<()> {
    let config = config::config().clone();
    tracing::info!("Starting services API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    if migrate {
        manager.migrate().await?;
    }

    let store = PgServiceStore::from_config(manager.pool(), &config.database);
    let repository = ServiceRepository::new(Arc::new(store), config.database.query_timeout());

    let port = port.unwrap_or(config.server.port);
    let state = AppState::new(repository, config);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("services API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    manager.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
