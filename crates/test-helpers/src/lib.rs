//! Test helpers for the dead man's button.
//!
//! Provides in-memory stand-ins for the escrow's external collaborators so
//! tests can drive the runner on virtual time:
//!
//! - [`scripted_source`]: a notification source the test pushes into, with
//!   the ability to inject a failure or end the stream
//! - [`RecordingSink`]: a disclosure sink that records every call with its
//!   (virtual) timestamp and can be armed to fail or hang
//! - [`fixtures`]: notification builders
//!
//! # Example
//!
//! ```rust
//! use deadman_test_helpers::{fixtures, scripted_source, RecordingSink};
//!
//! let (feed, source) = scripted_source();
//! let sink = RecordingSink::new();
//!
//! feed.push(fixtures::keysend_with_secret(&fixtures::secret(7)));
//! feed.close();
//! # drop((source, sink));
//! ```

pub mod fixtures;

use deadman_core::{CommitmentRequest, DisclosureError, DisclosureSink, SourceError};
use deadman_types::{Notification, Secret};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::time::Instant;

type Item = Result<Notification, SourceError>;

/// Create a connected feed/source pair.
pub fn scripted_source() -> (ScriptFeed, ScriptedSource) {
    let (tx, rx) = mpsc::unbounded();
    let pulled = Arc::new(AtomicUsize::new(0));
    (
        ScriptFeed {
            tx,
            pulled: pulled.clone(),
        },
        ScriptedSource { rx, pulled },
    )
}

/// Test-side handle for a [`ScriptedSource`].
#[derive(Clone)]
pub struct ScriptFeed {
    tx: mpsc::UnboundedSender<Item>,
    pulled: Arc<AtomicUsize>,
}

impl ScriptFeed {
    /// Queue a notification. Ignored once the source is gone.
    pub fn push(&self, notification: Notification) {
        let _ = self.tx.unbounded_send(Ok(notification));
    }

    /// Queue a source failure.
    pub fn fail(&self, error: SourceError) {
        let _ = self.tx.unbounded_send(Err(error));
    }

    /// End the stream once queued items are consumed.
    pub fn close(&self) {
        self.tx.close_channel();
    }

    /// Number of items the consumer has pulled so far.
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

/// Notification source backed by an unbounded channel.
pub struct ScriptedSource {
    rx: mpsc::UnboundedReceiver<Item>,
    pulled: Arc<AtomicUsize>,
}

impl Stream for ScriptedSource {
    type Item = Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.rx.poll_next_unpin(cx);
        if let Poll::Ready(Some(_)) = &polled {
            self.pulled.fetch_add(1, Ordering::SeqCst);
        }
        polled
    }
}

/// One call to [`RecordingSink::reveal`].
#[derive(Debug, Clone)]
pub struct Reveal {
    pub at: Instant,
    pub request: CommitmentRequest,
}

#[derive(Debug, Clone, Default)]
enum Mode {
    #[default]
    Accept,
    Fail(String),
    Hang,
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<Reveal>,
    mode: Mode,
}

/// Disclosure sink that records every call.
///
/// Clones share the same record, so a test keeps one clone and hands the
/// other to the runner.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.inner.lock().unwrap().mode = Mode::Fail(reason.into());
    }

    /// Make every subsequent call block forever.
    pub fn hang(&self) {
        self.inner.lock().unwrap().mode = Mode::Hang;
    }

    /// Every call so far, including failed and hanging ones.
    pub fn calls(&self) -> Vec<Reveal> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Secrets passed to the sink, in call order.
    pub fn revealed(&self) -> Vec<Secret> {
        self.calls().iter().map(|r| r.request.preimage).collect()
    }
}

impl DisclosureSink for RecordingSink {
    async fn reveal(&self, request: &CommitmentRequest) -> Result<(), DisclosureError> {
        let mode = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(Reveal {
                at: Instant::now(),
                request: *request,
            });
            inner.mode.clone()
        };

        match mode {
            Mode::Accept => Ok(()),
            Mode::Fail(reason) => Err(DisclosureError::Rejected(reason)),
            Mode::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_source_counts_pulls_and_closes() {
        let (feed, mut source) = scripted_source();
        feed.push(fixtures::keysend_with_secret(&fixtures::secret(1)));
        feed.fail(SourceError::Transport("reset".into()));
        feed.close();

        assert!(source.next().await.unwrap().is_ok());
        assert!(source.next().await.unwrap().is_err());
        assert!(source.next().await.is_none());
        assert_eq!(feed.pulled(), 2);
    }

    #[tokio::test]
    async fn test_recording_sink_modes() {
        let sink = RecordingSink::new();
        let request = CommitmentRequest::for_secret(fixtures::secret(1));

        sink.reveal(&request).await.unwrap();
        sink.fail_with("no route");
        assert!(matches!(
            sink.reveal(&request).await,
            Err(DisclosureError::Rejected(_))
        ));

        assert_eq!(sink.calls().len(), 2);
        assert_eq!(sink.revealed(), vec![fixtures::secret(1); 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_sink_never_completes() {
        let sink = RecordingSink::new();
        sink.hang();
        let request = CommitmentRequest::for_secret(fixtures::secret(1));

        let outcome =
            tokio::time::timeout(std::time::Duration::from_secs(60), sink.reveal(&request)).await;
        assert!(outcome.is_err());
        assert_eq!(sink.calls().len(), 1);
    }
}
