//! JSON output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write results as a pretty-printed JSON array, ascending by port.
pub fn write_json<W: Write>(report: &ScanReport, mut out: W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, &report.results)?;
    writeln!(out)?;
    Ok(())
}
