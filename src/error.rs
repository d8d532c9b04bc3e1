//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-port outcomes
//! (closed, filtered) are never errors; they are carried as data in
//! [`ProbeResult`](crate::scanner::ProbeResult).

use crate::types::{PortError, TargetError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid port specification: {0}")]
    InvalidPortSpec(#[from] PortError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to resolve host '{host}': {reason}")]
    HostResolution { host: String, reason: String },

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("cannot write output to {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load settings from {}: {reason}", path.display())]
    Settings { path: PathBuf, reason: String },
}

impl ScanError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidPortSpec(_) | Self::InvalidConfig(_) | Self::Settings { .. } => 2,
            Self::HostResolution { .. } => 3,
            Self::OutputWrite { .. } => 4,
            Self::ResourceExhausted(_) => 5,
        }
    }
}

impl From<TargetError> for ScanError {
    fn from(err: TargetError) -> Self {
        let host = match &err {
            TargetError::InvalidFormat(host)
            | TargetError::DnsResolutionFailed(host, _)
            | TargetError::NoAddressesFound(host) => host.clone(),
        };
        Self::HostResolution {
            host,
            reason: err.to_string(),
        }
    }
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;
