//! Notification builders.

use deadman_types::{
    AttemptState, Classification, Notification, PaymentAttempt, Secret, SECRET_RECORD_KEY,
};

/// A deterministic secret filled with `byte`.
pub fn secret(byte: u8) -> Secret {
    Secret::new([byte; 32])
}

/// A settled keysend carrying `secret` under the reserved record.
pub fn keysend_with_secret(secret: &Secret) -> Notification {
    keysend_with_record(secret.as_bytes().to_vec())
}

/// A settled keysend carrying arbitrary bytes under the reserved record.
pub fn keysend_with_record(record: Vec<u8>) -> Notification {
    Notification::new(
        Classification::Qualifying,
        vec![
            PaymentAttempt::new(AttemptState::Settled).with_attachment(SECRET_RECORD_KEY, record),
        ],
    )
}

/// A keysend whose first attempt is in `state`.
pub fn keysend_in_state(secret: &Secret, state: AttemptState) -> Notification {
    Notification::new(
        Classification::Qualifying,
        vec![PaymentAttempt::new(state)
            .with_attachment(SECRET_RECORD_KEY, secret.as_bytes().to_vec())],
    )
}

/// An ordinary (non-keysend) payment that happens to carry the record.
pub fn ordinary_with_secret(secret: &Secret) -> Notification {
    Notification::new(
        Classification::Ordinary,
        vec![PaymentAttempt::new(AttemptState::Settled)
            .with_attachment(SECRET_RECORD_KEY, secret.as_bytes().to_vec())],
    )
}

/// A settled keysend with no reserved record.
pub fn keysend_without_record() -> Notification {
    Notification::new(
        Classification::Qualifying,
        vec![PaymentAttempt::new(AttemptState::Settled).with_attachment(1, vec![1u8; 32])],
    )
}

/// A keysend with no attempts at all.
pub fn keysend_without_attempts() -> Notification {
    Notification::new(Classification::Qualifying, Vec::new())
}
