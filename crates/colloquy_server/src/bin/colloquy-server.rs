//! Colloquy relay server binary.
//!
//! Accepts typed text or recorded speech over HTTP, relays text to the
//! local inference backend, and streams the generated reply back to the
//! client.

use clap::Parser;
use colloquy_server::{AppState, RelayConfig, create_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the relay server.
#[derive(Parser, Debug)]
#[command(name = "colloquy-server")]
#[command(about = "Colloquy voice relay server")]
#[command(version)]
struct Args {
    /// Bind address for the HTTP server (overrides COLLOQUY_BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Validate configuration and exit without serving
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = RelayConfig::from_env()?;
    if let Some(bind) = args.bind {
        config = config.with_bind_addr(bind);
    }

    info!(
        backend = %config.backend_url(),
        model = %config.model(),
        stream_replies = config.stream_replies(),
        "Loaded configuration"
    );

    if args.check {
        info!("Configuration validated");
        return Ok(());
    }

    let bind_addr = config.bind_addr().clone();
    let state = AppState::new(config);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Relay listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install CTRL+C signal handler");
        return;
    }
    info!("Shutdown signal received, stopping gracefully");
}
