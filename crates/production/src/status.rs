//! Escrow status published by the runner.

use deadman_core::EscrowPhase;
use serde::{Deserialize, Serialize};

/// Snapshot of the escrow for external APIs.
///
/// The runner is the only writer; it publishes a fresh snapshot over a
/// `watch` channel whenever the table changes, so readers never touch the
/// pending table itself.
#[derive(Debug, Clone, Serialize)]
pub struct EscrowStatus {
    /// Current phase ("idle", "active" or "halted").
    pub phase: PhaseKind,
    /// Number of secrets currently held.
    pub pending_secrets: usize,
    /// Number of secrets disclosed since start.
    pub disclosed_secrets: u64,
    /// Fatal reason, once halted.
    pub halt_reason: Option<String>,
}

impl Default for EscrowStatus {
    fn default() -> Self {
        Self {
            phase: PhaseKind::Idle,
            pending_secrets: 0,
            disclosed_secrets: 0,
            halt_reason: None,
        }
    }
}

/// Serializable mirror of [`EscrowPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Idle,
    Active,
    Halted,
}

impl From<EscrowPhase> for PhaseKind {
    fn from(phase: EscrowPhase) -> Self {
        match phase {
            EscrowPhase::Idle => PhaseKind::Idle,
            EscrowPhase::Active => PhaseKind::Active,
            EscrowPhase::Halted => PhaseKind::Halted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_serializes_lowercase() {
        let json = serde_json::to_string(&EscrowStatus::default()).unwrap();
        assert!(json.contains(r#""phase":"idle""#));
        assert_eq!(PhaseKind::from(EscrowPhase::Halted), PhaseKind::Halted);
    }
}
