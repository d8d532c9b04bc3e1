//! Per-run scan configuration.

use crate::error::{ScanError, ScanResult};
use crate::types::PortSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default per-probe timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// Default number of probes in flight.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text grouped by status
    #[default]
    Text,
    /// CSV with a header row
    Csv,
    /// JSON array of results
    Json,
}

impl OutputFormat {
    /// Guess the format from a file extension (`.csv`, `.json`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Where the report is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

/// Immutable configuration for a single scan.
///
/// Built once from CLI input and settings, then passed by reference to the
/// coordinator and the reporter.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Host as given by the user.
    pub host: String,
    /// Ports to probe.
    pub ports: PortSpec,
    /// Upper bound on a single connect attempt.
    pub timeout: Duration,
    /// Maximum number of probes in flight.
    pub concurrency: usize,
    pub output: OutputTarget,
    pub format: OutputFormat,
    /// Log every probe as it completes.
    pub verbose: bool,
    /// Suppress the banner and progress bar.
    pub quiet: bool,
    /// List closed ports individually in text output.
    pub show_closed: bool,
}

impl ScanConfig {
    /// Create a configuration with default timeout, concurrency and output.
    pub fn new(host: impl Into<String>, ports: PortSpec) -> Self {
        Self {
            host: host.into(),
            ports,
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            output: OutputTarget::Stdout,
            format: OutputFormat::Text,
            verbose: false,
            quiet: false,
            show_closed: false,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout from fractional seconds.
    pub fn with_timeout_secs(self, secs: f64) -> ScanResult<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ScanError::InvalidConfig(format!(
                "timeout must be a positive number of seconds, got {secs}"
            )));
        }
        let timeout = Duration::try_from_secs_f64(secs)
            .map_err(|e| ScanError::InvalidConfig(format!("timeout {secs}: {e}")))?;
        Ok(self.with_timeout(timeout))
    }

    /// Set the concurrency bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Write the report to a file instead of stdout.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = OutputTarget::File(path.into());
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable per-probe logging.
    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Suppress the banner and progress bar.
    pub fn with_quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// List closed ports in text output.
    pub fn with_closed(mut self) -> Self {
        self.show_closed = true;
        self
    }

    /// Check the invariants the scanner relies on.
    pub fn validate(&self) -> ScanResult<()> {
        if self.host.trim().is_empty() {
            return Err(ScanError::InvalidConfig("host must not be empty".into()));
        }
        if self.ports.is_empty() {
            return Err(ScanError::InvalidConfig("no ports to scan".into()));
        }
        if self.timeout.is_zero() {
            return Err(ScanError::InvalidConfig("timeout must be greater than zero".into()));
        }
        if self.concurrency == 0 {
            return Err(ScanError::InvalidConfig("concurrency must be at least 1".into()));
        }
        Ok(())
    }
}
