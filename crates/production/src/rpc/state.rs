//! Shared state for RPC handlers.

use crate::status::{EscrowStatus, PhaseKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Shared state for RPC handlers.
#[derive(Clone)]
pub struct RpcState {
    /// Set once the daemon has finished start-up.
    pub ready: Arc<AtomicBool>,
    /// Latest snapshot published by the escrow runner.
    pub status: watch::Receiver<EscrowStatus>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl RpcState {
    pub fn new(status: watch::Receiver<EscrowStatus>) -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            status,
            start_time: Instant::now(),
        }
    }

    /// Ready means start-up finished and the escrow has not halted.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst) && self.status.borrow().phase != PhaseKind::Halted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_requires_flag_and_live_escrow() {
        let (tx, rx) = watch::channel(EscrowStatus::default());
        let state = RpcState::new(rx);
        assert!(!state.is_ready());

        state.ready.store(true, Ordering::SeqCst);
        assert!(state.is_ready());

        tx.send_replace(EscrowStatus {
            phase: PhaseKind::Halted,
            halt_reason: Some("Notification source closed".into()),
            ..Default::default()
        });
        assert!(!state.is_ready());
    }
}
