//! Service entry point.
//!
//! Initializes the bootstrap logger first so startup failures are visible,
//! then loads configuration, binds the listener and runs the server. A
//! startup failure is logged fatally and its full error chain is printed.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reqlog::config::{load_config, AppConfig};
use reqlog::errors::ErrorNode;
use reqlog::http::HttpServer;

#[derive(Parser)]
#[command(name = "reqlog")]
#[command(about = "Sample web service with structured request logging", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Bootstrap logger: env-driven, no dependency on the config file.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reqlog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("reqlog v0.1.0 starting");

    if let Err(error) = run(args).await {
        let chain = ErrorNode::from_error(error.as_ref());
        tracing::error!(error = %error, "startup failed");
        eprintln!("{}", chain.unwrap_full());
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = ?config.environment,
        http_request_logging = config.logging.http_request_logging,
        "configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
