// Noviq - HTTP service entry point

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use noviq::storage::ConfigService;
use noviq::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "noviq-server", version, about = "Noviq business-idea analysis service")]
struct Args {
    /// JSON config file (defaults to ~/.noviq/config.json when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(fmt::layer())
        .init();

    let args = Args::parse();
    let config = ConfigService::load(args.config.as_deref())
        .context("failed to load configuration")?
        .into_config();
    let addr = config
        .bind_addr()
        .map_err(anyhow::Error::msg)
        .context("invalid bind address")?;

    let state = AppState::from_config(&config).context("failed to initialize services")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "noviq-server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("noviq-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
