//! Secret extraction from payment notifications.
//!
//! The extractor is a best-effort filter, not a validator: a notification that
//! fails any check simply yields no secret. [`classify`] additionally reports
//! which check failed so callers can log and count rejections.

use deadman_types::{AttemptState, Classification, Notification, Secret, SECRET_RECORD_KEY};

/// Reason a notification did not yield a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Not a spontaneous (keysend) payment.
    NotQualifying,
    /// No delivery attempts were reported.
    NoAttempts,
    /// The first attempt is not settled.
    NotSettled,
    /// The first attempt carries no secret record.
    MissingRecord,
    /// The secret record is not exactly 32 bytes.
    MalformedSecret,
}

impl Rejection {
    /// Stable label, used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::NotQualifying => "not_qualifying",
            Rejection::NoAttempts => "no_attempts",
            Rejection::NotSettled => "not_settled",
            Rejection::MissingRecord => "missing_record",
            Rejection::MalformedSecret => "malformed_secret",
        }
    }
}

/// Run the predicate chain and report the first failing check.
///
/// Checks, in order:
/// 1. classification is qualifying
/// 2. at least one attempt exists
/// 3. the first attempt is settled (later attempts are never consulted)
/// 4. the first attempt carries [`SECRET_RECORD_KEY`]
/// 5. the record decodes to a 32-byte secret
pub fn classify(notification: &Notification) -> Result<Secret, Rejection> {
    if notification.classification != Classification::Qualifying {
        return Err(Rejection::NotQualifying);
    }

    let attempt = notification.first_attempt().ok_or(Rejection::NoAttempts)?;

    if attempt.state != AttemptState::Settled {
        return Err(Rejection::NotSettled);
    }

    let record = attempt
        .attachments
        .get(&SECRET_RECORD_KEY)
        .ok_or(Rejection::MissingRecord)?;

    Secret::from_slice(record).map_err(|_| Rejection::MalformedSecret)
}

/// Extract the embedded secret, if the notification qualifies.
pub fn extract_secret(notification: &Notification) -> Option<Secret> {
    classify(notification).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadman_types::PaymentAttempt;

    fn settled_with(record: Vec<u8>) -> PaymentAttempt {
        PaymentAttempt::new(AttemptState::Settled).with_attachment(SECRET_RECORD_KEY, record)
    }

    fn keysend(attempts: Vec<PaymentAttempt>) -> Notification {
        Notification::new(Classification::Qualifying, attempts)
    }

    #[test]
    fn test_extracts_secret_from_settled_keysend() {
        let n = keysend(vec![settled_with(vec![0u8; 32])]);
        assert_eq!(extract_secret(&n), Some(Secret::new([0u8; 32])));
    }

    #[test]
    fn test_ordinary_payment_ignored() {
        let n = Notification::new(Classification::Ordinary, vec![settled_with(vec![1u8; 32])]);
        assert_eq!(classify(&n), Err(Rejection::NotQualifying));
    }

    #[test]
    fn test_no_attempts_ignored() {
        assert_eq!(classify(&keysend(vec![])), Err(Rejection::NoAttempts));
    }

    #[test]
    fn test_unsettled_first_attempt_ignored() {
        for state in [AttemptState::Pending, AttemptState::Other] {
            let attempt = PaymentAttempt::new(state).with_attachment(SECRET_RECORD_KEY, vec![2u8; 32]);
            assert_eq!(classify(&keysend(vec![attempt])), Err(Rejection::NotSettled));
        }
    }

    #[test]
    fn test_only_first_attempt_consulted() {
        // A settled second attempt does not rescue an unsettled first one.
        let n = keysend(vec![
            PaymentAttempt::new(AttemptState::Pending),
            settled_with(vec![3u8; 32]),
        ]);
        assert_eq!(classify(&n), Err(Rejection::NotSettled));

        // And a settled first attempt without the record is not rescued by a later one.
        let n = keysend(vec![
            PaymentAttempt::new(AttemptState::Settled),
            settled_with(vec![3u8; 32]),
        ]);
        assert_eq!(classify(&n), Err(Rejection::MissingRecord));
    }

    #[test]
    fn test_other_record_keys_ignored() {
        let attempt = PaymentAttempt::new(AttemptState::Settled)
            .with_attachment(SECRET_RECORD_KEY + 1, vec![4u8; 32])
            .with_attachment(5482373484, vec![4u8; 32]);
        assert_eq!(classify(&keysend(vec![attempt])), Err(Rejection::MissingRecord));
    }

    #[test]
    fn test_wrong_length_record_ignored() {
        for len in [0usize, 1, 31, 33, 64] {
            let n = keysend(vec![settled_with(vec![5u8; len])]);
            assert_eq!(classify(&n), Err(Rejection::MalformedSecret), "len {}", len);
        }
    }

    #[test]
    fn test_rejection_labels_are_distinct() {
        let labels = [
            Rejection::NotQualifying,
            Rejection::NoAttempts,
            Rejection::NotSettled,
            Rejection::MissingRecord,
            Rejection::MalformedSecret,
        ]
        .map(|r| r.as_str());
        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }
}
