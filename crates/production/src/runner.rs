//! Escrow runner.
//!
//! # Architecture
//!
//! Uses the event aggregator pattern: a single task owns the [`EscrowState`]
//! and is the only code that ever touches the pending table. Everything else
//! reaches it through channels, so no locks are needed.
//!
//! ```text
//!  ┌──────────────────────┐  mpsc (capacity 1)   ┌────────────────────────────┐
//!  │ Producer task        │ ───── Secret ──────► │ EscrowRunner::run          │
//!  │  source.next()       │                      │  loop { select! {          │
//!  │  classify()          │  oneshot             │    secret  => on_secret    │
//!  │                      │ ── ProducerExit ───► │    tick    => on_tick      │──► DisclosureSink
//!  └──────────────────────┘                      │    fatal   => halt         │
//!                                                │  } }                       │
//!                        tokio interval (1s) ──► └────────────────────────────┘
//! ```
//!
//! The handoff channel holds a single secret, so a slow runner (for example
//! one stuck inside a disclosure) stalls the producer instead of letting
//! secrets pile up in transit.
//!
//! The loop has no shutdown path of its own. It returns only on a fatal
//! condition: the source failing or ending, or a disclosure failing. At that
//! point every pending secret is discarded.

use crate::status::{EscrowStatus, PhaseKind};
use deadman_core::{
    classify, CommitmentRequest, DisclosureError, DisclosureSink, EscrowState, NotificationSource,
    SourceError,
};
use deadman_metrics as metrics;
use deadman_types::{Secret, SecretHash, TICK_PERIOD};
use futures::StreamExt;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Fatal conditions that halt the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Notification source failed: {0}")]
    SourceFailed(#[source] SourceError),
    #[error("Notification source closed")]
    SourceClosed,
    #[error("Producer task exited without reporting")]
    ProducerGone,
    #[error("Disclosure of {hash} failed: {source}")]
    DisclosureFailed {
        hash: SecretHash,
        #[source]
        source: DisclosureError,
    },
}

impl RunnerError {
    /// Stable label, used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            RunnerError::SourceFailed(_) => "source_failed",
            RunnerError::SourceClosed => "source_closed",
            RunnerError::ProducerGone => "producer_gone",
            RunnerError::DisclosureFailed { .. } => "disclosure_failed",
        }
    }
}

/// Halt reason published after an operator shutdown.
const SHUTDOWN_REASON: &str = "Shutdown requested";

/// How the producer task ended.
#[derive(Debug)]
enum ProducerExit {
    Failed(SourceError),
    Closed,
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Drives an [`EscrowState`] from a notification source, a clock and a
/// disclosure sink.
pub struct EscrowRunner<S> {
    sink: S,
    escrow: EscrowState,
    disclosed: u64,
    status_tx: Arc<watch::Sender<EscrowStatus>>,
}

impl<S: DisclosureSink> EscrowRunner<S> {
    pub fn new(sink: S) -> Self {
        let (status_tx, _) = watch::channel(EscrowStatus::default());
        Self {
            sink,
            escrow: EscrowState::new(),
            disclosed: 0,
            status_tx: Arc::new(status_tx),
        }
    }

    /// Subscribe to status snapshots.
    ///
    /// The receiver stays valid after the runner halts and then holds the
    /// final snapshot.
    pub fn status(&self) -> watch::Receiver<EscrowStatus> {
        self.status_tx.subscribe()
    }

    /// Run the escrow until a fatal condition occurs.
    ///
    /// Never returns `Ok`. Dropping the returned future (for example on an
    /// operator shutdown) discards pending secrets exactly like a halt.
    pub async fn run<N: NotificationSource>(mut self, source: N) -> Result<Infallible, RunnerError> {
        let (secret_tx, mut secret_rx) = mpsc::channel::<Secret>(1);
        let (exit_tx, mut exit_rx) = oneshot::channel::<ProducerExit>();
        let _producer = AbortOnDrop(tokio::spawn(produce(source, secret_tx, exit_tx)));

        let start = Instant::now();
        let mut ticker = tokio::time::interval_at(start + TICK_PERIOD, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(tick = ?TICK_PERIOD, "Escrow runner started");
        self.publish_status(None);

        let error = loop {
            tokio::select! {
                exit = &mut exit_rx => {
                    break exit_to_error(exit.ok());
                }

                maybe_secret = secret_rx.recv() => {
                    match maybe_secret {
                        Some(secret) => self.on_secret(start, secret),
                        // The producer reports before dropping its sender, so a
                        // missing report means it died.
                        None => break exit_to_error(exit_rx.try_recv().ok()),
                    }
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.on_tick(start).await {
                        break e;
                    }
                }
            }
        };

        let discarded = self.escrow.halt();
        warn!(error = %error, discarded, "Escrow halted, pending secrets discarded");
        metrics::record_halt(error.reason());
        metrics::set_pending_secrets(0);
        self.publish_status(Some(error.to_string()));

        Err(error)
    }

    /// Run the escrow until a fatal condition occurs or `shutdown` resolves.
    ///
    /// An operator shutdown returns `Ok(())`. Pending secrets are dropped
    /// with the runner, same as on a halt, and the final snapshot reports the
    /// escrow as halted with nothing pending.
    pub async fn run_until<N, F>(self, source: N, shutdown: F) -> Result<(), RunnerError>
    where
        N: NotificationSource,
        F: Future<Output = ()>,
    {
        let status_tx = Arc::clone(&self.status_tx);
        tokio::select! {
            result = self.run(source) => match result {
                Ok(never) => match never {},
                Err(e) => Err(e),
            },
            _ = shutdown => {
                let last = status_tx.borrow().clone();
                info!(
                    discarded = last.pending_secrets,
                    "Shutdown requested, pending secrets discarded"
                );
                metrics::set_pending_secrets(0);
                status_tx.send_replace(EscrowStatus {
                    phase: PhaseKind::Halted,
                    pending_secrets: 0,
                    disclosed_secrets: last.disclosed_secrets,
                    halt_reason: Some(SHUTDOWN_REASON.to_string()),
                });
                Ok(())
            }
        }
    }

    fn on_secret(&mut self, start: Instant, secret: Secret) {
        self.escrow.set_time(start.elapsed());
        let Some(admission) = self.escrow.on_secret(secret) else {
            return;
        };

        info!(
            hash = %secret.hash(),
            due_in = ?admission.due.saturating_sub(self.escrow.now()),
            rearmed = admission.rearmed,
            "Received secret"
        );
        metrics::record_secret_admitted(admission.rearmed);
        metrics::set_pending_secrets(self.escrow.pending_len());
        self.publish_status(None);
    }

    /// Disclose every secret whose hold has elapsed.
    ///
    /// Stops at the first failure; the remaining due secrets are left for the
    /// halt to discard.
    async fn on_tick(&mut self, start: Instant) -> Result<(), RunnerError> {
        self.escrow.set_time(start.elapsed());
        let due = self.escrow.due_secrets();
        if due.is_empty() {
            return Ok(());
        }
        trace!(count = due.len(), "Secrets due");

        for secret in due {
            let Some(due_at) = self.escrow.due_time(&secret) else {
                continue;
            };
            let hash = secret.hash();
            info!(hash = %hash, "Revealing secret");

            let request = CommitmentRequest::for_secret(secret);
            if let Err(source) = self.sink.reveal(&request).await {
                metrics::record_disclosure_failure();
                return Err(RunnerError::DisclosureFailed { hash, source });
            }

            self.escrow.mark_disclosed(&secret);
            self.disclosed += 1;

            let lateness = start.elapsed().saturating_sub(due_at);
            debug!(hash = %hash, lateness = ?lateness, "Secret disclosed");
            metrics::record_secret_disclosed(lateness.as_secs_f64());
        }

        metrics::set_pending_secrets(self.escrow.pending_len());
        self.publish_status(None);
        Ok(())
    }

    fn publish_status(&self, halt_reason: Option<String>) {
        self.status_tx.send_replace(EscrowStatus {
            phase: self.escrow.phase().into(),
            pending_secrets: self.escrow.pending_len(),
            disclosed_secrets: self.disclosed,
            halt_reason,
        });
    }
}

fn exit_to_error(exit: Option<ProducerExit>) -> RunnerError {
    match exit {
        Some(ProducerExit::Failed(e)) => RunnerError::SourceFailed(e),
        Some(ProducerExit::Closed) => RunnerError::SourceClosed,
        None => RunnerError::ProducerGone,
    }
}

/// Pull notifications, extract secrets and hand them to the runner.
///
/// Reports how the source ended on `exit` before dropping `secrets`.
async fn produce<N: NotificationSource>(
    mut source: N,
    secrets: mpsc::Sender<Secret>,
    exit: oneshot::Sender<ProducerExit>,
) {
    let reason = loop {
        match source.next().await {
            Some(Ok(notification)) => {
                metrics::record_notification_received();
                match classify(&notification) {
                    Ok(secret) => {
                        if secrets.send(secret).await.is_err() {
                            // Runner is gone; nobody to report to.
                            return;
                        }
                    }
                    Err(rejection) => {
                        trace!(reason = rejection.as_str(), "Ignoring notification");
                        metrics::record_notification_ignored(rejection.as_str());
                    }
                }
            }
            Some(Err(e)) => break ProducerExit::Failed(e),
            None => break ProducerExit::Closed,
        }
    };

    debug!(exit = ?reason, "Producer stopped");
    let _ = exit.send(reason);
}
