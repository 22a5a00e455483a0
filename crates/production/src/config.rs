//! Daemon configuration.
//!
//! Loaded from a TOML file. Every section is optional and falls back to its
//! defaults, so an empty file (or no file at all) yields a daemon that reads
//! notifications from stdin and journals disclosures to
//! `./disclosures.jsonl`.
//!
//! ```toml
//! [source]
//! kind = "file"
//! path = "/var/run/deadman/feed.jsonl"
//!
//! [sink]
//! kind = "command"
//! program = "/usr/local/bin/add-invoice"
//! args = ["--preimage", "{preimage}"]
//!
//! [telemetry]
//! log_file = "/var/log/deadman.log"
//!
//! [metrics]
//! enabled = true
//! listen_addr = "127.0.0.1:9108"
//! ```
//!
//! The hold period and tick cadence are protocol constants and cannot be
//! configured.

use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid metrics listen address {addr}: {source}")]
    InvalidListenAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DaemonConfig {
    /// Where notifications come from.
    #[serde(default)]
    pub source: SourceConfig,

    /// How secrets are disclosed.
    #[serde(default)]
    pub sink: SinkConfig,

    /// Logging configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// HTTP status and metrics endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Notification source selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// JSON lines on standard input.
    #[default]
    Stdin,
    /// JSON lines read from a file or named pipe.
    File { path: PathBuf },
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceConfig::Stdin => write!(f, "stdin"),
            SourceConfig::File { path } => write!(f, "file {}", path.display()),
        }
    }
}

/// Disclosure sink selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkConfig {
    /// Append each disclosure to a JSON-lines journal.
    Journal {
        #[serde(default = "default_journal_path")]
        path: PathBuf,
    },
    /// Run an external program per disclosure.
    Command {
        program: PathBuf,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::Journal {
            path: default_journal_path(),
        }
    }
}

fn default_journal_path() -> PathBuf {
    PathBuf::from("./disclosures.jsonl")
}

/// Telemetry configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryConfig {
    /// Optional log file path. If provided, logs are written to this file.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Serve `/metrics` and the status API.
    #[serde(default)]
    pub enabled: bool,

    /// HTTP listen address.
    #[serde(default = "default_metrics_addr")]
    pub listen_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: default_metrics_addr(),
        }
    }
}

fn default_metrics_addr() -> String {
    "127.0.0.1:9108".to_string()
}

impl MetricsConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|source| ConfigError::InvalidListenAddr {
                addr: self.listen_addr.clone(),
                source,
            })
    }
}

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub feed: Option<PathBuf>,
    pub logfile: Option<PathBuf>,
    pub metrics_addr: Option<String>,
}

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply command-line overrides to the configuration.
    ///
    /// Giving a metrics address also enables the endpoint.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref feed) = overrides.feed {
            self.source = SourceConfig::File { path: feed.clone() };
        }

        if let Some(ref logfile) = overrides.logfile {
            self.telemetry.log_file = Some(logfile.clone());
        }

        if let Some(ref metrics_addr) = overrides.metrics_addr {
            self.metrics.listen_addr = metrics_addr.clone();
            self.metrics.enabled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DaemonConfig::parse("").unwrap();
        assert_eq!(config.source, SourceConfig::Stdin);
        assert_eq!(
            config.sink,
            SinkConfig::Journal {
                path: PathBuf::from("./disclosures.jsonl")
            }
        );
        assert!(config.telemetry.log_file.is_none());
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.listen_addr, "127.0.0.1:9108");
    }

    #[test]
    fn test_full_config() {
        let config = DaemonConfig::parse(
            r#"
            [source]
            kind = "file"
            path = "/var/run/deadman/feed.jsonl"

            [sink]
            kind = "command"
            program = "/usr/local/bin/add-invoice"
            args = ["--preimage", "{preimage}"]

            [telemetry]
            log_file = "/var/log/deadman.log"

            [metrics]
            enabled = true
            listen_addr = "0.0.0.0:9200"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.source,
            SourceConfig::File {
                path: PathBuf::from("/var/run/deadman/feed.jsonl")
            }
        );
        assert_eq!(
            config.sink,
            SinkConfig::Command {
                program: PathBuf::from("/usr/local/bin/add-invoice"),
                args: vec!["--preimage".into(), "{preimage}".into()],
            }
        );
        assert_eq!(
            config.telemetry.log_file,
            Some(PathBuf::from("/var/log/deadman.log"))
        );
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.socket_addr().unwrap().port(), 9200);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(SourceConfig::Stdin.to_string(), "stdin");
        let file = SourceConfig::File {
            path: PathBuf::from("/tmp/feed"),
        };
        assert_eq!(file.to_string(), "file /tmp/feed");
    }

    #[test]
    fn test_journal_path_defaults_when_omitted() {
        let config = DaemonConfig::parse("[sink]\nkind = \"journal\"\n").unwrap();
        assert_eq!(config.sink, SinkConfig::default());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = DaemonConfig::parse("[source]\nkind = \"grpc\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        // A command sink without a program is incomplete.
        assert!(DaemonConfig::parse("[sink]\nkind = \"command\"\n").is_err());
    }

    #[test]
    fn test_invalid_listen_addr() {
        let config = DaemonConfig::parse("[metrics]\nlisten_addr = \"nowhere\"\n").unwrap();
        assert!(matches!(
            config.metrics.socket_addr(),
            Err(ConfigError::InvalidListenAddr { .. })
        ));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = DaemonConfig::default();
        config.apply_overrides(&ConfigOverrides {
            feed: Some(PathBuf::from("/tmp/feed")),
            logfile: Some(PathBuf::from("/tmp/deadman.log")),
            metrics_addr: Some("127.0.0.1:9999".into()),
        });

        assert_eq!(
            config.source,
            SourceConfig::File {
                path: PathBuf::from("/tmp/feed")
            }
        );
        assert_eq!(
            config.telemetry.log_file,
            Some(PathBuf::from("/tmp/deadman.log"))
        );
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.listen_addr, "127.0.0.1:9999");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[metrics]\nenabled = true").unwrap();

        let config = DaemonConfig::load(file.path()).unwrap();
        assert!(config.metrics.enabled);

        let missing = DaemonConfig::load(Path::new("/nonexistent/deadman.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
