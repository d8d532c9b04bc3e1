//! # portsweep - a concurrent TCP connect port scanner
//!
//! portsweep resolves a single host, probes a set of TCP ports with a
//! bounded number of concurrent connects, and reports every port as
//! open, closed or filtered in text, CSV or JSON.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::config::ScanConfig;
//! use portsweep::scanner::{run_scan, TcpProber};
//! use portsweep::types::ScanTarget;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), portsweep::ScanError> {
//!     let config = ScanConfig::new("127.0.0.1", "22,80,443".parse()?);
//!     let target = ScanTarget::resolve(&config.host).await?;
//!     let prober = TcpProber::new(target, config.timeout);
//!
//!     let report = run_scan(&prober, &config, std::future::pending()).await?;
//!     for result in &report.results {
//!         println!("{} {}", result.port, result.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port specifications and target resolution
//! - [`scanner`] - The `Prober` trait, the TCP prober and the scan coordinator
//! - [`output`] - Text, CSV and JSON reporters
//! - [`config`] - Per-run configuration and persistent settings
//! - [`services`] - Well-known service names
//! - [`error`] - Error types
//! - [`cli`] - Command-line front end

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::{OutputFormat, OutputTarget, ScanConfig};
pub use error::{ScanError, ScanResult};
pub use scanner::{run_scan, ProbeResult, ProbeStatus, Prober, ScanOutcome, ScanReport};
pub use types::{Port, PortSpec, ScanTarget};
