//! Dead Man's Button daemon.
//!
//! Holds every secret delivered by a spontaneous payment for a fixed period
//! and then discloses it, unless the daemon dies first.
//!
//! # Usage
//!
//! ```bash
//! # Read notifications from stdin, journal disclosures to ./disclosures.jsonl
//! lnd-keysend-feed | deadman
//!
//! # Start with a configuration file
//! deadman --config deadman.toml
//!
//! # Read from a named pipe and expose metrics
//! deadman --config deadman.toml --feed /var/run/deadman/feed --metrics-addr 127.0.0.1:9108
//! ```
//!
//! See `DaemonConfig` for the configuration file format.
//!
//! The process exits non-zero when the escrow halts; restarting it is left to
//! the supervisor.

use anyhow::{Context, Result};
use clap::Parser;
use deadman_production::rpc::{RpcServer, RpcServerConfig};
use deadman_production::{
    init_logging, open_source, ConfigOverrides, ConfiguredSink, DaemonConfig, EscrowRunner,
};
use deadman_types::{HOLD_PERIOD, SECRET_RECORD_KEY, TICK_PERIOD};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

/// Dead Man's Button
///
/// Escrows secrets received with keysend payments and discloses them after a
/// fixed hold period.
#[derive(Parser, Debug)]
#[command(name = "deadman")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read notifications from this file instead of the configured source
    #[arg(long)]
    feed: Option<PathBuf>,

    /// Metrics listen address (overrides config, enables the endpoint)
    #[arg(long)]
    metrics_addr: Option<String>,

    /// Log level filter, used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Path to log file (redirects all logs to this file)
    #[arg(long)]
    logfile: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            feed: self.feed.clone(),
            logfile: self.logfile.clone(),
            metrics_addr: self.metrics_addr.clone(),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DaemonConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    config.apply_overrides(&cli.overrides());

    let _log_guard = init_logging(&cli.log_level, config.telemetry.log_file.as_deref())
        .context("Failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        hold = ?HOLD_PERIOD,
        tick = ?TICK_PERIOD,
        record_key = SECRET_RECORD_KEY,
        "Dead Man's Button starting"
    );

    let sink = ConfiguredSink::from_config(&config.sink);
    info!(source = %config.source, sink = %sink, "Configured");

    let source = open_source(&config.source)
        .await
        .with_context(|| format!("Failed to open notification source: {}", config.source))?;

    let runner = EscrowRunner::new(sink);

    let rpc_handle = if config.metrics.enabled {
        deadman_metrics_prometheus::install();
        let rpc_config = RpcServerConfig {
            listen_addr: config.metrics.socket_addr()?,
        };
        let handle = RpcServer::new(rpc_config, runner.status())
            .start()
            .await
            .context("Failed to start RPC server")?;
        Some(handle)
    } else {
        None
    };

    if let Some(ref handle) = rpc_handle {
        handle.set_ready(true);
    }

    info!("Escrow running, press Ctrl+C to stop");

    let result = runner.run_until(source, shutdown_signal()).await;

    if let Some(handle) = rpc_handle {
        handle.abort();
    }

    match result {
        Ok(()) => {
            info!("Shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Escrow halted");
            Err(e).context("Escrow halted")
        }
    }
}
