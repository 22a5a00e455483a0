//! Response bodies for the HTTP API.

use crate::status::{EscrowStatus, PhaseKind};
use serde::{Deserialize, Serialize};

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Response for `GET /ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub ready: bool,
}

/// Response for `GET /api/v1/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub phase: PhaseKind,
    pub pending_secrets: usize,
    pub disclosed_secrets: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halt_reason: Option<String>,
    pub uptime_secs: u64,
    pub version: String,
}

impl StatusResponse {
    pub fn from_status(status: &EscrowStatus, uptime_secs: u64) -> Self {
        Self {
            phase: status.phase,
            pending_secrets: status.pending_secrets,
            disclosed_secrets: status.disclosed_secrets,
            halt_reason: status.halt_reason.clone(),
            uptime_secs,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
