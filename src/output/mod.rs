//! Output formatting module.
//!
//! Renders a [`ScanReport`] as text, CSV or JSON to stdout or a file, and
//! provides the console helpers used around a scan.

mod csv_format;
mod json_format;
mod text;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use text::write_text;

use crate::config::{OutputFormat, OutputTarget, ScanConfig};
use crate::error::{ScanError, ScanResult};
use crate::scanner::ScanReport;
use crate::types::ScanTarget;
use console::style;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Presentation switches for text output.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// List closed ports individually.
    pub show_closed: bool,
    /// Emit ANSI colors.
    pub colors: bool,
}

/// Render a report in the given format.
pub fn render<W: Write>(
    report: &ScanReport,
    format: OutputFormat,
    out: W,
    options: RenderOptions,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_text(report, out, options),
        OutputFormat::Csv => write_csv(report, out),
        OutputFormat::Json => write_json(report, out),
    }
}

/// Write a report to the configured output target.
///
/// If the output file cannot be written, the results are printed to stdout
/// as text before the error is returned, so a finished scan is never lost.
pub fn write_report(report: &ScanReport, config: &ScanConfig) -> ScanResult<()> {
    if !report.is_complete() && config.format != OutputFormat::Text {
        print_warning(&format!("scan {}", incomplete_summary(report)));
    }

    match &config.output {
        OutputTarget::Stdout => {
            let options = RenderOptions {
                show_closed: config.show_closed,
                colors: console::colors_enabled(),
            };
            render(report, config.format, io::stdout().lock(), options).map_err(|source| {
                ScanError::OutputWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })
        }
        OutputTarget::File(path) => {
            let options = RenderOptions {
                show_closed: config.show_closed,
                colors: false,
            };
            let written = File::create(path).and_then(|file| {
                let mut out = BufWriter::new(file);
                render(report, config.format, &mut out, options)?;
                out.flush()
            });

            if let Err(source) = written {
                print_warning(&format!(
                    "could not write {}; printing results to stdout instead",
                    path.display()
                ));
                let fallback = RenderOptions {
                    show_closed: config.show_closed,
                    colors: console::colors_enabled(),
                };
                // Best effort: the write error below is what gets reported.
                let _ = write_text(report, io::stdout().lock(), fallback);
                return Err(ScanError::OutputWrite {
                    path: path.clone(),
                    source,
                });
            }
            Ok(())
        }
    }
}

/// One-line description of why a report is partial.
pub(crate) fn incomplete_summary(report: &ScanReport) -> String {
    format!(
        "INCOMPLETE ({}: {} of {} ports probed)",
        report.outcome,
        report.results.len(),
        report.requested
    )
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &ScanTarget, ports: usize, concurrency: usize, timeout: Duration) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("portsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {} ({})",
        style("•").dim(),
        style(&target.original).white().bold(),
        target.ip
    );
    println!(
        "{} Ports: {}  Workers: {}  Timeout: {}s",
        style("•").dim(),
        style(ports).white().bold(),
        concurrency,
        timeout.as_secs_f64()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), msg);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scanner::{ProbeResult, ProbeStatus, ScanOutcome};
    use crate::types::Port;
    use chrono::Utc;
    use std::net::{IpAddr, Ipv4Addr};

    /// A complete report over the given results.
    pub(crate) fn report(results: Vec<ProbeResult>) -> ScanReport {
        ScanReport {
            target: ScanTarget::new("h", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            started_at: Utc::now(),
            duration: Duration::from_millis(1500),
            requested: results.len(),
            results,
            outcome: ScanOutcome::Complete,
        }
    }

    fn config(ports: &str) -> ScanConfig {
        ScanConfig::new("h", ports.parse().unwrap())
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        let config = config("22")
            .with_output_file(&path)
            .with_format(OutputFormat::Json);
        let report = report(vec![ProbeResult::new(
            "h",
            Port::new(22).unwrap(),
            ProbeStatus::Open,
        )]);

        write_report(&report, &config).unwrap();

        let parsed: Vec<ProbeResult> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, report.results);
    }

    #[test]
    fn test_unwritable_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("scan.csv");
        let config = config("22")
            .with_output_file(&path)
            .with_format(OutputFormat::Csv);

        let err = write_report(&report(Vec::new()), &config).unwrap_err();
        assert!(matches!(err, ScanError::OutputWrite { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_incomplete_summary() {
        let mut report = report(Vec::new());
        report.requested = 5;
        report.outcome = ScanOutcome::Aborted {
            reason: "too many open files".into(),
        };
        assert_eq!(
            incomplete_summary(&report),
            "INCOMPLETE (aborted: too many open files: 0 of 5 ports probed)"
        );
    }
}
