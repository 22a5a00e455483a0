//! Core logic for the dead man's button.
//!
//! This crate provides the runtime-independent pieces of the system:
//!
//! - [`extract_secret`]: the filter that turns a [`Notification`] into zero or
//!   one [`Secret`]
//! - [`EscrowState`]: the state machine that owns the pending-secrets table
//! - [`DisclosureSink`] / [`NotificationSource`]: the contracts for the
//!   external collaborators
//!
//! # Architecture
//!
//! ```text
//! NotificationSource → extract_secret → EscrowState::on_secret
//!             clock → EscrowState::set_time → due_secrets → DisclosureSink::reveal
//!                                                       └→ mark_disclosed
//! ```
//!
//! The state machine is:
//! - **Synchronous**: No async, no .await
//! - **Deterministic**: Time is injected; same inputs = same table
//! - **Pure-ish**: Mutates self, but performs no I/O
//!
//! All I/O is handled by the runner (`deadman-production`), which owns the
//! state machine exclusively and drives it from a single event loop.
//!
//! [`Notification`]: deadman_types::Notification
//! [`Secret`]: deadman_types::Secret

mod escrow;
mod extractor;
mod sink;
mod source;

pub use escrow::{Admission, EscrowPhase, EscrowState};
pub use extractor::{classify, extract_secret, Rejection};
pub use sink::{CommitmentRequest, DisclosureError, DisclosureSink};
pub use source::{NotificationSource, SourceError};
