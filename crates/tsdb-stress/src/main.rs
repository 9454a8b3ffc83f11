//! CLI entry point for the load generator.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tsdb_stress::config::{
    Config, Protocol, TrafficShape, DEFAULT_DATASET_SIZE, DEFAULT_HOST_COUNT, DEFAULT_KEYSPACE,
    DEFAULT_PORT, DEFAULT_SERVICE_COUNT, DEFAULT_WORKERS,
};
use tsdb_stress::{Dispatcher, RunContext};

#[derive(Parser)]
#[command(name = "tsdb-stress")]
#[command(author, version, about = "Continuous synthetic load generator for time series ingestion")]
struct Cli {
    /// Number of points to send for each host-service combination
    #[arg(long = "dataset", default_value_t = DEFAULT_DATASET_SIZE)]
    dataset_size: usize,

    /// Number of hosts to use in the tags
    #[arg(long = "hosts", default_value_t = DEFAULT_HOST_COUNT)]
    host_count: u64,

    /// Number of services to use in the tags
    #[arg(long = "services", default_value_t = DEFAULT_SERVICE_COUNT)]
    service_count: u64,

    /// Port of the target servers
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Method to use when sending data (http or udp)
    #[arg(long, default_value = "http")]
    protocol: String,

    /// Keyspace to send data to
    #[arg(short, long, default_value = DEFAULT_KEYSPACE)]
    keyspace: String,

    /// Number of parallel workers
    #[arg(short, long, alias = "go", default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Target servers
    servers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let protocol: Protocol = match cli.protocol.parse() {
        Ok(protocol) => protocol,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let config = Config {
        servers: cli.servers,
        port: cli.port,
        protocol,
        workers: cli.workers,
        shape: TrafficShape {
            dataset_size: cli.dataset_size,
            host_count: cli.host_count,
            service_count: cli.service_count,
            keyspace: cli.keyspace,
        },
    };

    let dispatcher = match Dispatcher::new(config, RunContext::new()) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Run nonce: {}", dispatcher.context().nonce());

    let shutdown = CancellationToken::new();
    tokio::spawn(handle_signals(shutdown.clone()));

    dispatcher.run(shutdown).await?;
    Ok(())
}

/// First SIGINT/SIGTERM stops workers after their current pass; a second one exits at once.
async fn handle_signals(shutdown: CancellationToken) {
    wait_for_signal().await;
    warn!("Signal received, stopping workers after the current pass (signal again to exit now)");
    shutdown.cancel();

    wait_for_signal().await;
    warn!("Second signal received, exiting");
    std::process::exit(130);
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
