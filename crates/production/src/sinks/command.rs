//! Command sink: hand each disclosure to an external program.
//!
//! The program receives the disclosure in its environment:
//!
//! - `DEADMAN_PREIMAGE`: preimage, hex
//! - `DEADMAN_PAYMENT_HASH`: payment hash, hex
//! - `DEADMAN_VALUE_SAT`: declared value in satoshis
//!
//! The placeholders `{preimage}`, `{payment_hash}` and `{value_sat}` are also
//! substituted in its arguments. A non-zero exit is a disclosure failure.

use deadman_core::{CommitmentRequest, DisclosureError, DisclosureSink};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CommandSink {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSink {
    pub fn new(program: impl AsRef<Path>, args: Vec<String>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, request: &CommitmentRequest) -> Command {
        let preimage = request.preimage.to_hex();
        let payment_hash = request.payment_hash().to_hex();
        let value_sat = request.declared_value_sat.to_string();

        let args = self.args.iter().map(|arg| {
            arg.replace("{preimage}", &preimage)
                .replace("{payment_hash}", &payment_hash)
                .replace("{value_sat}", &value_sat)
        });

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .env("DEADMAN_PREIMAGE", &preimage)
            .env("DEADMAN_PAYMENT_HASH", &payment_hash)
            .env("DEADMAN_VALUE_SAT", &value_sat)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl DisclosureSink for CommandSink {
    async fn reveal(&self, request: &CommitmentRequest) -> Result<(), DisclosureError> {
        let output = self.command(request).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DisclosureError::Rejected(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        debug!(
            hash = %request.payment_hash(),
            program = %self.program.display(),
            "Command accepted disclosure"
        );
        Ok(())
    }
}
