//! Configuration management for portsweep.
//!
//! [`ScanConfig`] is the immutable per-run configuration; [`AppSettings`]
//! holds user defaults loaded from an XDG-compliant settings file.

mod scan;
mod settings;

pub use scan::{OutputFormat, OutputTarget, ScanConfig, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
pub use settings::AppSettings;
