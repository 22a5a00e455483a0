//! Inbound payment notifications.
//!
//! A [`Notification`] is the transport-neutral form of one payment delivery as
//! reported by the payment node. Only the fields the extractor inspects are
//! modelled.

use std::collections::BTreeMap;

/// Whether a notification belongs to the class that may carry a secret.
///
/// In the payment domain, qualifying notifications are spontaneous
/// (keysend) payments; everything else is ordinary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Qualifying,
    Ordinary,
}

/// State of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptState {
    /// Held but not yet resolved.
    Pending,
    /// Resolved successfully.
    Settled,
    /// Any other state (canceled, unknown, ...).
    Other,
}

/// One delivery attempt of a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAttempt {
    pub state: AttemptState,
    /// Opaque attachments keyed by record number.
    pub attachments: BTreeMap<u64, Vec<u8>>,
}

impl PaymentAttempt {
    /// Create an attempt with no attachments.
    pub fn new(state: AttemptState) -> Self {
        Self {
            state,
            attachments: BTreeMap::new(),
        }
    }

    /// Builder-style helper to add an attachment.
    pub fn with_attachment(mut self, key: u64, value: impl Into<Vec<u8>>) -> Self {
        self.attachments.insert(key, value.into());
        self
    }
}

/// An inbound payment notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub classification: Classification,
    /// Delivery attempts, in the order the payment node reported them.
    pub attempts: Vec<PaymentAttempt>,
}

impl Notification {
    pub fn new(classification: Classification, attempts: Vec<PaymentAttempt>) -> Self {
        Self {
            classification,
            attempts,
        }
    }

    /// First reported attempt, if any.
    pub fn first_attempt(&self) -> Option<&PaymentAttempt> {
        self.attempts.first()
    }
}
