//! Notification source contract.

use deadman_types::Notification;
use futures::Stream;
use thiserror::Error;

/// Errors reported by a notification source.
///
/// Any error, like the end of the stream, is fatal to the escrow.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed notification: {0}")]
    Decode(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// A live, unbounded stream of notifications.
///
/// Blanket-implemented for every suitable [`Stream`]. Termination (`None`)
/// and `Err` items are both fatal to the consumer.
pub trait NotificationSource:
    Stream<Item = Result<Notification, SourceError>> + Send + Unpin + 'static
{
}

impl<T> NotificationSource for T where
    T: Stream<Item = Result<Notification, SourceError>> + Send + Unpin + 'static
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn assert_source<S: NotificationSource>(_: &S) {}

    #[tokio::test]
    async fn test_iter_stream_is_a_source() {
        let mut source = futures::stream::iter(vec![Err::<Notification, _>(
            SourceError::Transport("gone".into()),
        )]);
        assert_source(&source);

        let item = source.next().await.unwrap();
        assert!(matches!(item, Err(SourceError::Transport(_))));
        assert!(source.next().await.is_none());
    }
}
