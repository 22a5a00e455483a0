//! Core types for the dead man's button.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace:
//!
//! - **Primitives**: [`Secret`] (a 32-byte preimage) and [`SecretHash`]
//!   (its SHA-256 payment hash)
//! - **Inputs**: [`Notification`] and its [`PaymentAttempt`]s, the abstract
//!   form of an inbound payment event
//! - **Domain constants**: the reserved attachment key, hold period and tick
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend on
//! any other workspace crates, making it the foundation layer.

mod notification;
mod params;
mod secret;

pub use notification::{AttemptState, Classification, Notification, PaymentAttempt};
pub use params::{DECLARED_VALUE_SAT, HOLD_PERIOD, SECRET_LEN, SECRET_RECORD_KEY, TICK_PERIOD};
pub use secret::{HexError, Secret, SecretHash, SecretLengthError};
