//! Prober trait abstraction.
//!
//! Defines the per-port probe interface the coordinator drives, so the
//! coordinator can be exercised against test doubles as well as real sockets.

use crate::error::ScanResult;
use crate::types::{Port, ScanTarget};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Status of a probed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// Handshake completed; a service is listening.
    Open,
    /// No response within the timeout, or the host/network was unreachable.
    /// A timeout and a filtered port are reported the same way.
    Filtered,
    /// Connection actively refused.
    Closed,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Filtered => write!(f, "filtered"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Result of probing a single port. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Host as given by the user.
    pub host: String,
    /// The port that was probed.
    pub port: Port,
    /// Status determined by the probe.
    pub status: ProbeStatus,
    /// Conventional service name, for open ports with a known name.
    pub service: Option<String>,
    /// Handshake time in milliseconds, for open ports.
    pub latency_ms: Option<f64>,
}

impl ProbeResult {
    /// Create a new probe result.
    pub fn new(host: impl Into<String>, port: Port, status: ProbeStatus) -> Self {
        Self {
            host: host.into(),
            port,
            status,
            service: None,
            latency_ms: None,
        }
    }

    /// Set the service hint.
    pub fn with_service(mut self, service: Option<&str>) -> Self {
        self.service = service.map(str::to_string);
        self
    }

    /// Set the latency, rounded to microsecond precision.
    pub fn with_latency(mut self, elapsed: Duration) -> Self {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.latency_ms = Some((ms * 1000.0).round() / 1000.0);
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status == ProbeStatus::Open
    }
}

/// Trait for single-port probe implementations.
///
/// A probe never fails for per-port outcomes: refusals and timeouts are
/// reported as [`ProbeStatus`]. `Err` is reserved for infrastructural
/// failures that make continuing the scan pointless.
#[async_trait]
pub trait Prober: Send + Sync {
    /// The resolved target being probed.
    fn target(&self) -> &ScanTarget;

    /// Upper bound on a single probe.
    fn timeout(&self) -> Duration;

    /// Probe a single port.
    async fn probe(&self, port: Port) -> ScanResult<ProbeResult>;
}
