//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write results as CSV: header row, then one row per port in ascending order.
pub fn write_csv<W: Write>(report: &ScanReport, out: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["host", "port", "status", "service", "latency_ms"])?;

    for result in &report.results {
        let port = result.port.to_string();
        let status = result.status.to_string();
        let latency = result.latency_ms.map_or(String::new(), |ms| ms.to_string());
        wtr.write_record([
            result.host.as_str(),
            port.as_str(),
            status.as_str(),
            result.service.as_deref().unwrap_or(""),
            latency.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
