//! Plain text output formatting.
//!
//! Produces human-readable output grouped by status, with optional colors.

use super::RenderOptions;
use crate::scanner::{ProbeStatus, ScanReport};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "───────────────────────────────────────────────";

/// Write results as text: a summary header, then one section per status.
pub fn write_text<W: Write>(report: &ScanReport, mut out: W, options: RenderOptions) -> io::Result<()> {
    let colors = options.colors;
    let bold = Style::new().bold().force_styling(colors);
    let dim = Style::new().dim().force_styling(colors);

    writeln!(out, "{} {}", bold.apply_to("Scan report for"), report.target)?;
    writeln!(
        out,
        "Started {}, {} ports in {:.2}s",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.requested,
        report.duration.as_secs_f64()
    )?;
    if report.is_complete() {
        writeln!(out, "Status: complete")?;
    } else {
        writeln!(
            out,
            "Status: {}",
            style(super::incomplete_summary(report))
                .yellow()
                .bold()
                .force_styling(colors)
        )?;
    }
    writeln!(
        out,
        "{} open, {} closed, {} filtered",
        style(report.count(ProbeStatus::Open)).green().bold().force_styling(colors),
        style(report.count(ProbeStatus::Closed)).red().force_styling(colors),
        style(report.count(ProbeStatus::Filtered)).yellow().force_styling(colors)
    )?;

    for status in [ProbeStatus::Open, ProbeStatus::Filtered, ProbeStatus::Closed] {
        let count = report.count(status);
        if count == 0 {
            continue;
        }

        let heading = match status {
            ProbeStatus::Open => Style::new().green().bold(),
            ProbeStatus::Filtered => Style::new().yellow().bold(),
            ProbeStatus::Closed => Style::new().red().bold(),
        }
        .force_styling(colors);

        writeln!(out)?;
        writeln!(
            out,
            "{} ({})",
            heading.apply_to(status.to_string().to_uppercase()),
            count
        )?;

        if status == ProbeStatus::Closed && !options.show_closed {
            writeln!(
                out,
                "  {}",
                dim.apply_to(format!("{count} closed ports not shown (use --show-closed)"))
            )?;
            continue;
        }

        writeln!(out, "  {}", dim.apply_to(RULE))?;
        writeln!(out, "  {:>6}  {:<16}  {}", "PORT", "SERVICE", "LATENCY")?;
        for result in report.with_status(status) {
            let latency = result
                .latency_ms
                .map(|ms| format!("{ms:.3} ms"))
                .unwrap_or_default();
            writeln!(
                out,
                "  {:>6}  {:<16}  {}",
                result.port,
                result.service.as_deref().unwrap_or("-"),
                latency
            )?;
        }
    }

    Ok(())
}
