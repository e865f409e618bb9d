//! Attestation server binary

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use attestation_server::{router, AppState, Settings};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for the attestation server
#[derive(Parser, Debug)]
#[command(name = "attestation-server")]
#[command(about = "Training attestation and document generation server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Directory holding convention_patterns.json and attestation_layout.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut settings = Settings::from_env();
    if let Some(dir) = args.config_dir {
        settings = settings.with_config_dir(dir);
    }
    let state = AppState::load(settings).context("Failed to load configuration")?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}
