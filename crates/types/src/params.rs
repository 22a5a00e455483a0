//! Fixed protocol parameters.
//!
//! None of these are configurable at runtime.

use std::time::Duration;

/// Attachment key under which a sender embeds the secret.
pub const SECRET_RECORD_KEY: u64 = 80000;

/// Length of a secret (preimage) in bytes.
pub const SECRET_LEN: usize = 32;

/// Minimum time a secret is held before it becomes eligible for disclosure.
pub const HOLD_PERIOD: Duration = Duration::from_secs(10);

/// Cadence at which pending secrets are re-evaluated.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Value declared on every disclosure commitment, in satoshis.
pub const DECLARED_VALUE_SAT: u64 = 1000;
