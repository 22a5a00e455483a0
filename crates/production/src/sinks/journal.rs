//! Journal sink: one JSON line per disclosure.

use deadman_core::{CommitmentRequest, DisclosureError, DisclosureSink};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// One journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub payment_hash: String,
    pub preimage: String,
    pub value_sat: u64,
    pub revealed_at_unix: u64,
}

impl JournalEntry {
    fn new(request: &CommitmentRequest) -> Self {
        let revealed_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            payment_hash: request.payment_hash().to_hex(),
            preimage: request.preimage.to_hex(),
            value_sat: request.declared_value_sat,
            revealed_at_unix,
        }
    }
}

/// Appends disclosures to a file and syncs it before reporting success.
///
/// The file is opened per disclosure, so external rotation is picked up.
#[derive(Debug, Clone)]
pub struct JournalSink {
    path: PathBuf,
}

impl JournalSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DisclosureSink for JournalSink {
    async fn reveal(&self, request: &CommitmentRequest) -> Result<(), DisclosureError> {
        let mut line =
            serde_json::to_vec(&JournalEntry::new(request)).map_err(std::io::Error::from)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.sync_all().await?;

        debug!(
            hash = %request.payment_hash(),
            path = %self.path.display(),
            "Journaled disclosure"
        );
        Ok(())
    }
}
