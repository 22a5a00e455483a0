//! Disclosure contract.
//!
//! A [`DisclosureSink`] performs the one-shot, irreversible reveal of a secret.
//! The escrow guarantees at most one successful call per pending entry, so
//! sinks do not need to deduplicate.

use deadman_types::{Secret, SecretHash, DECLARED_VALUE_SAT};
use std::future::Future;
use thiserror::Error;

/// Parameters of a disclosure: create a commitment that embeds the preimage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitmentRequest {
    pub preimage: Secret,
    /// Value declared on the commitment, in satoshis.
    pub declared_value_sat: u64,
}

impl CommitmentRequest {
    /// Request disclosing `secret` with the fixed declared value.
    pub fn for_secret(secret: Secret) -> Self {
        Self {
            preimage: secret,
            declared_value_sat: DECLARED_VALUE_SAT,
        }
    }

    pub fn payment_hash(&self) -> SecretHash {
        self.preimage.hash()
    }
}

/// Errors from a disclosure attempt.
///
/// Every variant is fatal to the escrow; there is no per-secret retry.
#[derive(Debug, Error)]
pub enum DisclosureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Disclosure rejected: {0}")]
    Rejected(String),
}

/// The external action that reveals a secret.
pub trait DisclosureSink: Send + Sync + 'static {
    /// Reveal the preimage carried by `request`.
    ///
    /// The escrow awaits this inline, with no timeout: a call that never
    /// completes stalls the escrow.
    fn reveal(
        &self,
        request: &CommitmentRequest,
    ) -> impl Future<Output = Result<(), DisclosureError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink(AtomicUsize);

    impl DisclosureSink for CountingSink {
        async fn reveal(&self, _request: &CommitmentRequest) -> Result<(), DisclosureError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_request_uses_fixed_value() {
        let secret = Secret::new([1u8; 32]);
        let request = CommitmentRequest::for_secret(secret);
        assert_eq!(request.declared_value_sat, 1000);
        assert_eq!(request.payment_hash(), secret.hash());
    }

    #[tokio::test]
    async fn test_sink_impl_with_async_fn() {
        let sink = CountingSink(AtomicUsize::new(0));
        let request = CommitmentRequest::for_secret(Secret::new([2u8; 32]));
        sink.reveal(&request).await.unwrap();
        assert_eq!(sink.0.load(Ordering::SeqCst), 1);
    }
}
