//! Concrete disclosure sinks.
//!
//! - [`JournalSink`]: appends each disclosure to a JSON-lines file
//! - [`CommandSink`]: hands each disclosure to an external program, such as
//!   a wrapper that creates the invoice on the payment node
//!
//! [`ConfiguredSink`] selects one of them from [`SinkConfig`].

mod command;
mod journal;

pub use command::CommandSink;
pub use journal::{JournalEntry, JournalSink};

use crate::config::SinkConfig;
use deadman_core::{CommitmentRequest, DisclosureError, DisclosureSink};
use std::fmt;

/// The sink chosen by the daemon configuration.
#[derive(Debug)]
pub enum ConfiguredSink {
    Journal(JournalSink),
    Command(CommandSink),
}

impl ConfiguredSink {
    pub fn from_config(config: &SinkConfig) -> Self {
        match config {
            SinkConfig::Journal { path } => ConfiguredSink::Journal(JournalSink::new(path)),
            SinkConfig::Command { program, args } => {
                ConfiguredSink::Command(CommandSink::new(program, args.clone()))
            }
        }
    }
}

impl DisclosureSink for ConfiguredSink {
    async fn reveal(&self, request: &CommitmentRequest) -> Result<(), DisclosureError> {
        match self {
            ConfiguredSink::Journal(sink) => sink.reveal(request).await,
            ConfiguredSink::Command(sink) => sink.reveal(request).await,
        }
    }
}

impl fmt::Display for ConfiguredSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfiguredSink::Journal(sink) => write!(f, "journal {}", sink.path().display()),
            ConfiguredSink::Command(sink) => write!(f, "command {}", sink.program().display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_config_and_display() {
        let journal = ConfiguredSink::from_config(&SinkConfig::default());
        assert!(matches!(journal, ConfiguredSink::Journal(_)));
        assert_eq!(journal.to_string(), "journal ./disclosures.jsonl");

        let command = ConfiguredSink::from_config(&SinkConfig::Command {
            program: PathBuf::from("/bin/true"),
            args: vec![],
        });
        assert_eq!(command.to_string(), "command /bin/true");
    }
}
