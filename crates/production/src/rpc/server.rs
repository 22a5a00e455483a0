//! RPC server implementation.

use super::routes::create_router;
use super::state::RpcState;
use crate::status::EscrowStatus;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Errors from the RPC server.
#[derive(Debug, Error)]
pub enum RpcServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

/// Configuration for the RPC server.
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    /// Address to listen on.
    pub listen_addr: SocketAddr,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 9108)),
        }
    }
}

/// Handle for controlling a running RPC server.
pub struct RpcServerHandle {
    task: JoinHandle<()>,
    ready_flag: Arc<AtomicBool>,
    local_addr: SocketAddr,
}

impl RpcServerHandle {
    /// Mark the daemon as ready (for readiness probe).
    pub fn set_ready(&self, ready: bool) {
        self.ready_flag.store(ready, Ordering::SeqCst);
    }

    /// Address the server actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Abort the server.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// HTTP server exposing probes, metrics and escrow status.
pub struct RpcServer {
    config: RpcServerConfig,
    state: RpcState,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, status: watch::Receiver<EscrowStatus>) -> Self {
        Self {
            config,
            state: RpcState::new(status),
        }
    }

    /// Start the server and return a handle for control.
    pub async fn start(self) -> Result<RpcServerHandle, RpcServerError> {
        let ready_flag = self.state.ready.clone();
        let router = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(self.config.listen_addr).await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "RPC server listening");

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = ?e, "RPC server error");
            }
        });

        Ok(RpcServerHandle {
            task,
            ready_flag,
            local_addr,
        })
    }
}
