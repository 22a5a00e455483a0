//! Escrow state machine.
//!
//! [`EscrowState`] owns the pending-secrets table. It is driven by exactly one
//! owner (the runner's event loop), so it needs no synchronization: every
//! mutation goes through `&mut self`.
//!
//! # Lifecycle
//!
//! ```text
//!            on_secret                    mark_disclosed (last entry)
//!   Idle ───────────────► Active ─────────────────────────────► Idle
//!    │                      │ ▲ on_secret (upsert, re-arms hold)
//!    │ halt                 │ └──────┘
//!    ▼                      ▼ halt
//!  Halted ◄─────────────────┘   (pending entries discarded)
//! ```
//!
//! Time is a `Duration` since the runner started, injected via
//! [`EscrowState::set_time`] before each input. Eligibility is only evaluated
//! when the runner asks for [`EscrowState::due_secrets`] on a tick; entries
//! never expire on their own.

use deadman_types::{Secret, HOLD_PERIOD};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace};

/// Coarse state of the escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowPhase {
    /// No secrets pending.
    Idle,
    /// At least one secret pending.
    Active,
    /// A fatal condition occurred. Terminal.
    Halted,
}

/// Result of admitting a secret into the escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Time at which the secret becomes eligible for disclosure.
    pub due: Duration,
    /// True if the secret was already pending and its hold was restarted.
    pub rearmed: bool,
}

/// The pending-secrets table and its clock.
#[derive(Debug, Default)]
pub struct EscrowState {
    /// Secret → due time. At most one entry per secret value.
    pending: HashMap<Secret, Duration>,
    now: Duration,
    halted: bool,
}

impl EscrowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current time.
    ///
    /// Called by the runner before each input.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Get the current time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn phase(&self) -> EscrowPhase {
        if self.halted {
            EscrowPhase::Halted
        } else if self.pending.is_empty() {
            EscrowPhase::Idle
        } else {
            EscrowPhase::Active
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Due time of a pending secret.
    pub fn due_time(&self, secret: &Secret) -> Option<Duration> {
        self.pending.get(secret).copied()
    }

    /// Admit a secret, holding it for [`HOLD_PERIOD`] from now.
    ///
    /// A secret that is already pending has its due time overwritten, so the
    /// hold restarts from the latest arrival rather than stacking.
    ///
    /// Returns `None` once halted; a halted escrow accepts nothing.
    pub fn on_secret(&mut self, secret: Secret) -> Option<Admission> {
        if self.halted {
            trace!(hash = %secret.hash(), "Escrow halted, ignoring secret");
            return None;
        }

        let due = self.now + HOLD_PERIOD;
        let rearmed = self.pending.insert(secret, due).is_some();
        Some(Admission { due, rearmed })
    }

    /// Secrets whose hold has elapsed at the current time.
    ///
    /// Entries are not removed; the runner calls [`mark_disclosed`] after each
    /// successful disclosure. The returned order is by due time, then by
    /// payment hash. Callers must not rely on it for correctness.
    ///
    /// [`mark_disclosed`]: EscrowState::mark_disclosed
    pub fn due_secrets(&self) -> Vec<Secret> {
        if self.halted {
            return Vec::new();
        }

        let mut due: Vec<(Duration, Secret)> = self
            .pending
            .iter()
            .filter(|(_, due)| self.now >= **due)
            .map(|(secret, due)| (*due, *secret))
            .collect();
        due.sort_by_cached_key(|(due, secret)| (*due, secret.hash()));
        due.into_iter().map(|(_, secret)| secret).collect()
    }

    /// Remove a secret after it was disclosed.
    ///
    /// Returns `false` if the secret was not pending, in which case it must
    /// not be disclosed again.
    pub fn mark_disclosed(&mut self, secret: &Secret) -> bool {
        self.pending.remove(secret).is_some()
    }

    /// Enter the terminal state, discarding every pending secret.
    ///
    /// Returns the number of discarded secrets.
    pub fn halt(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        self.halted = true;
        debug!(discarded, "Escrow halted");
        discarded
    }
}
