//! Metrics facade for the dead man's button.
//!
//! Provides a [`MetricsRecorder`] trait with domain-specific methods and default
//! no-op implementations. A global singleton recorder is accessed via [`recorder()`],
//! and convenience free functions delegate to it.
//!
//! # Usage
//!
//! Callers record metrics via free functions:
//! ```ignore
//! deadman_metrics::record_notification_received();
//! deadman_metrics::set_pending_secrets(escrow.pending_len());
//! ```
//!
//! At startup, install a backend:
//! ```ignore
//! deadman_metrics_prometheus::install();
//! ```
//!
//! Without an installed backend every call is a no-op, which is what tests use.

use std::sync::OnceLock;

// ═══════════════════════════════════════════════════════════════════════
// Trait
// ═══════════════════════════════════════════════════════════════════════

/// Domain-specific metrics recording trait.
///
/// All methods have default no-op implementations so backends only need
/// to override the metrics they care about.
#[allow(unused_variables)]
pub trait MetricsRecorder: Send + Sync + 'static {
    // ── Ingress ──────────────────────────────────────────────────────

    /// Record a notification pulled from the source.
    fn record_notification_received(&self) {}

    /// Record a notification that yielded no secret.
    fn record_notification_ignored(&self, reason: &str) {}

    // ── Escrow ───────────────────────────────────────────────────────

    /// Record a secret admitted into escrow. `rearmed` is true if it was
    /// already pending.
    fn record_secret_admitted(&self, rearmed: bool) {}

    /// Set the pending secrets gauge.
    fn set_pending_secrets(&self, count: usize) {}

    /// Record a secret disclosed, with the time between its due time and
    /// the disclosure.
    fn record_secret_disclosed(&self, lateness_secs: f64) {}

    /// Record a failed disclosure attempt.
    fn record_disclosure_failure(&self) {}

    /// Record the escrow halting, with the fatal reason.
    fn record_halt(&self, reason: &str) {}
}

// ═══════════════════════════════════════════════════════════════════════
// Global singleton
// ═══════════════════════════════════════════════════════════════════════

struct NoopRecorder;
impl MetricsRecorder for NoopRecorder {}

static RECORDER: OnceLock<Box<dyn MetricsRecorder>> = OnceLock::new();

/// Install a global metrics recorder.
///
/// Can only be called once. Subsequent calls are silently ignored.
pub fn set_global_recorder(recorder: Box<dyn MetricsRecorder>) {
    let _ = RECORDER.set(recorder);
}

/// Get the global metrics recorder.
///
/// Returns a no-op recorder if none has been installed.
#[inline]
fn recorder() -> &'static dyn MetricsRecorder {
    RECORDER.get().map(|r| r.as_ref()).unwrap_or(&NoopRecorder)
}

// ═══════════════════════════════════════════════════════════════════════
// Convenience free functions
// ═══════════════════════════════════════════════════════════════════════

// ── Ingress ──────────────────────────────────────────────────────────

/// Record a notification pulled from the source.
#[inline]
pub fn record_notification_received() {
    recorder().record_notification_received();
}

/// Record a notification that yielded no secret.
#[inline]
pub fn record_notification_ignored(reason: &str) {
    recorder().record_notification_ignored(reason);
}

// ── Escrow ───────────────────────────────────────────────────────────

/// Record a secret admitted into escrow.
#[inline]
pub fn record_secret_admitted(rearmed: bool) {
    recorder().record_secret_admitted(rearmed);
}

/// Set the pending secrets gauge.
#[inline]
pub fn set_pending_secrets(count: usize) {
    recorder().set_pending_secrets(count);
}

/// Record a secret disclosed.
#[inline]
pub fn record_secret_disclosed(lateness_secs: f64) {
    recorder().record_secret_disclosed(lateness_secs);
}

/// Record a failed disclosure attempt.
#[inline]
pub fn record_disclosure_failure() {
    recorder().record_disclosure_failure();
}

/// Record the escrow halting.
#[inline]
pub fn record_halt(reason: &str) {
    recorder().record_halt(reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_functions_without_recorder_are_noops() {
        record_notification_received();
        record_notification_ignored("not_qualifying");
        record_secret_admitted(false);
        set_pending_secrets(3);
        record_secret_disclosed(0.5);
        record_disclosure_failure();
        record_halt("source_closed");
    }
}
