//! JSON-lines notification feed.
//!
//! Each non-blank line is one payment notification as reported by the payment
//! node:
//!
//! ```json
//! {"is_keysend": true, "htlcs": [{"state": "settled", "custom_records": {"80000": "<hex>"}}]}
//! ```
//!
//! Record keys are decimal strings and record values are hex. A line that
//! fails to decode is a source failure and ends the stream, as does any read
//! error. End of input ends the stream without an error.

use crate::config::SourceConfig;
use deadman_core::SourceError;
use deadman_types::{AttemptState, Classification, Notification, PaymentAttempt};
use futures::stream::{BoxStream, StreamExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

/// Boxed notification stream produced by the feed.
pub type NotificationFeed = BoxStream<'static, Result<Notification, SourceError>>;

#[derive(Debug, Deserialize)]
struct WireNotification {
    #[serde(default)]
    is_keysend: bool,
    #[serde(default)]
    htlcs: Vec<WireHtlc>,
}

#[derive(Debug, Deserialize)]
struct WireHtlc {
    #[serde(default)]
    state: String,
    #[serde(default)]
    custom_records: BTreeMap<String, String>,
}

impl TryFrom<WireNotification> for Notification {
    type Error = SourceError;

    fn try_from(wire: WireNotification) -> Result<Self, Self::Error> {
        let classification = if wire.is_keysend {
            Classification::Qualifying
        } else {
            Classification::Ordinary
        };

        let attempts = wire
            .htlcs
            .into_iter()
            .map(PaymentAttempt::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Notification::new(classification, attempts))
    }
}

impl TryFrom<WireHtlc> for PaymentAttempt {
    type Error = SourceError;

    fn try_from(wire: WireHtlc) -> Result<Self, Self::Error> {
        let mut attempt = PaymentAttempt::new(parse_state(&wire.state));
        for (key, value) in wire.custom_records {
            let key: u64 = key
                .parse()
                .map_err(|_| SourceError::Decode(format!("invalid record key {key:?}")))?;
            let value = hex::decode(&value)
                .map_err(|e| SourceError::Decode(format!("record {key} is not hex: {e}")))?;
            attempt = attempt.with_attachment(key, value);
        }
        Ok(attempt)
    }
}

fn parse_state(state: &str) -> AttemptState {
    match state.to_ascii_lowercase().as_str() {
        "settled" => AttemptState::Settled,
        "accepted" | "pending" => AttemptState::Pending,
        _ => AttemptState::Other,
    }
}

/// Decode a single feed line.
pub fn parse_line(line: &str) -> Result<Notification, SourceError> {
    let wire: WireNotification =
        serde_json::from_str(line).map_err(|e| SourceError::Decode(e.to_string()))?;
    Notification::try_from(wire)
}

/// Turn a byte stream of JSON lines into a notification stream.
pub fn json_lines<R>(reader: R) -> NotificationFeed
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let lines = BufReader::new(reader).lines();
    futures::stream::unfold(Some(lines), next_notification).boxed()
}

/// Yield the next notification; `None` state means the stream has failed.
async fn next_notification<R>(
    state: Option<Lines<BufReader<R>>>,
) -> Option<(Result<Notification, SourceError>, Option<Lines<BufReader<R>>>)>
where
    R: AsyncRead + Unpin,
{
    let mut lines = state?;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                return match parse_line(trimmed) {
                    Ok(notification) => Some((Ok(notification), Some(lines))),
                    Err(e) => Some((Err(e), None)),
                };
            }
            Ok(None) => return None,
            Err(e) => return Some((Err(SourceError::Io(e)), None)),
        }
    }
}

/// Open the configured notification source.
pub async fn open_source(config: &SourceConfig) -> Result<NotificationFeed, SourceError> {
    match config {
        SourceConfig::Stdin => Ok(json_lines(tokio::io::stdin())),
        SourceConfig::File { path } => {
            let file = tokio::fs::File::open(path).await?;
            Ok(json_lines(file))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadman_types::SECRET_RECORD_KEY;

    const ZERO_SECRET_HEX: &str =
        "0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn test_parse_keysend_line() {
        let line = format!(
            r#"{{"is_keysend":true,"htlcs":[{{"state":"settled","custom_records":{{"80000":"{ZERO_SECRET_HEX}"}}}}]}}"#
        );
        let notification = parse_line(&line).unwrap();

        assert_eq!(notification.classification, Classification::Qualifying);
        let attempt = notification.first_attempt().unwrap();
        assert_eq!(attempt.state, AttemptState::Settled);
        assert_eq!(attempt.attachments[&SECRET_RECORD_KEY], vec![0u8; 32]);
    }

    #[test]
    fn test_missing_fields_default() {
        let notification = parse_line("{}").unwrap();
        assert_eq!(notification.classification, Classification::Ordinary);
        assert!(notification.attempts.is_empty());
    }

    #[test]
    fn test_state_mapping() {
        assert_eq!(parse_state("settled"), AttemptState::Settled);
        assert_eq!(parse_state("SETTLED"), AttemptState::Settled);
        assert_eq!(parse_state("accepted"), AttemptState::Pending);
        assert_eq!(parse_state("canceled"), AttemptState::Other);
        assert_eq!(parse_state("something-new"), AttemptState::Other);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(parse_line("not json"), Err(SourceError::Decode(_))));
        assert!(matches!(
            parse_line(r#"{"htlcs":[{"custom_records":{"abc":"00"}}]}"#),
            Err(SourceError::Decode(_))
        ));
        assert!(matches!(
            parse_line(r#"{"htlcs":[{"custom_records":{"80000":"zz"}}]}"#),
            Err(SourceError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_stream_skips_blank_lines_and_ends_at_eof() {
        let input = b"{\"is_keysend\":true}\n\n   \n{\"is_keysend\":false}\n".to_vec();
        let mut feed = json_lines(std::io::Cursor::new(input));

        let first = feed.next().await.unwrap().unwrap();
        assert_eq!(first.classification, Classification::Qualifying);
        let second = feed.next().await.unwrap().unwrap();
        assert_eq!(second.classification, Classification::Ordinary);
        assert!(feed.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_ends_after_decode_error() {
        let input = b"{}\ngarbage\n{}\n".to_vec();
        let mut feed = json_lines(std::io::Cursor::new(input));

        assert!(feed.next().await.unwrap().is_ok());
        assert!(matches!(
            feed.next().await.unwrap(),
            Err(SourceError::Decode(_))
        ));
        assert!(feed.next().await.is_none());
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let config = SourceConfig::File {
            path: "/nonexistent/feed.jsonl".into(),
        };
        assert!(matches!(
            open_source(&config).await,
            Err(SourceError::Io(_))
        ));
    }
}
