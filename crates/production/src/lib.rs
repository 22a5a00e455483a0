//! Production runner with async I/O.
//!
//! This crate wraps the deterministic escrow state machine from
//! `deadman-core` with real I/O:
//!
//! - Notifications from a JSON-lines feed (stdin or a file)
//! - Disclosures through a journal file or an external command
//! - The hold clock via a tokio interval
//! - An optional HTTP server for probes, metrics and status
//!
//! # Architecture
//!
//! Uses the event aggregator pattern: a single task owns the escrow state and
//! receives secrets via a capacity-one mpsc channel. This avoids mutex
//! contention and keeps backpressure on the source.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          deadman daemon                                 │
//! │                                                                         │
//! │  feed (JSON lines) ──► producer task ──► EscrowRunner ──► DisclosureSink│
//! │                          classify()       │  ▲                          │
//! │                                           │  └── tick (1s)              │
//! │                                           ▼                             │
//! │                                  watch<EscrowStatus> ──► RpcServer      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use deadman_production::{json_lines, EscrowRunner, JournalSink};
//!
//! # async fn example() {
//! let runner = EscrowRunner::new(JournalSink::new("./disclosures.jsonl"));
//! let source = json_lines(tokio::io::stdin());
//! if let Err(e) = runner.run(source).await {
//!     eprintln!("escrow halted: {e}");
//! }
//! # }
//! ```

pub mod config;
mod feed;
pub mod rpc;
mod runner;
pub mod sinks;
mod status;
pub mod telemetry;

pub use config::{
    ConfigError, ConfigOverrides, DaemonConfig, MetricsConfig, SinkConfig, SourceConfig,
    TelemetryConfig,
};
pub use feed::{json_lines, open_source, parse_line, NotificationFeed};
pub use runner::{EscrowRunner, RunnerError};
pub use sinks::{CommandSink, ConfiguredSink, JournalEntry, JournalSink};
pub use status::{EscrowStatus, PhaseKind};
pub use telemetry::{init_logging, TelemetryError};
