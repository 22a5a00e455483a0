//! HTTP API for the deadman daemon.
//!
//! # Health & Readiness
//!
//! - `GET /health` - Liveness probe (always returns 200 if server running)
//! - `GET /ready` - Readiness probe (200 while the escrow runs, 503 before
//!   start-up completes or once it has halted)
//!
//! # Metrics & Observability
//!
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /api/v1/status` - Escrow status (phase, pending and disclosed
//!   counts, halt reason)
//!
//! The API is read-only. Secrets never appear in any response.
//!
//! # Example
//!
//! ```ignore
//! let runner = EscrowRunner::new(sink);
//! let config = RpcServerConfig {
//!     listen_addr: "127.0.0.1:9108".parse()?,
//! };
//! let handle = RpcServer::new(config, runner.status()).start().await?;
//! handle.set_ready(true);
//! ```

mod handlers;
mod routes;
mod server;
pub(crate) mod state;
mod types;

pub use routes::create_router;
pub use server::{RpcServer, RpcServerConfig, RpcServerError, RpcServerHandle};
pub use state::RpcState;
pub use types::*;
