//! Command-line interface for portsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing, then merges
//! the flags with [`AppSettings`] into a single immutable [`ScanConfig`].

use crate::config::{AppSettings, OutputFormat, OutputTarget, ScanConfig};
use crate::error::ScanError;
use crate::output;
use crate::scanner::{run_scan, ScanOutcome, TcpProber};
use crate::types::{PortSpec, ScanTarget};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Exit code for a scan cancelled by the user.
pub const EXIT_INTERRUPTED: u8 = 130;

/// A concurrent TCP connect port scanner.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Probe TCP ports on a host and report open, closed and filtered ports", long_about = None)]
pub struct Args {
    /// Target IP address or hostname to scan
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: String,

    /// Ports to scan (e.g. "22", "1-1024", "80,443,8000-9000")
    #[arg(short, long, value_name = "SPEC")]
    pub ports: String,

    /// Per-probe connection timeout in seconds [default: 1.0]
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Maximum number of probes in flight [default: 100]
    #[arg(short, long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Write the report to a file instead of stdout.
    ///
    /// CSV and JSON files carry no incomplete-scan marker: an interrupted
    /// or aborted scan is reported on stderr and through the exit code only.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format [default: from the output extension, else text]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// List closed ports individually in text output
    #[arg(long)]
    pub show_closed: bool,

    /// Log every probe as it completes
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress the banner and progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH", env = "PORTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Build the scan configuration. Flags take precedence over settings.
    pub fn to_config(&self, settings: &AppSettings) -> Result<ScanConfig, ScanError> {
        let ports: PortSpec = self.ports.parse()?;

        let format = self
            .format
            .or_else(|| self.output.as_deref().and_then(OutputFormat::from_path))
            .unwrap_or(settings.default_format);

        let mut config = ScanConfig::new(self.host.trim(), ports)
            .with_timeout_secs(self.timeout.unwrap_or(settings.default_timeout_secs))?
            .with_concurrency(self.concurrency.unwrap_or(settings.default_concurrency))
            .with_format(format);

        if let Some(path) = &self.output {
            config = config.with_output_file(path);
        }
        if self.show_closed || settings.show_closed {
            config = config.with_closed();
        }
        if self.verbose {
            config = config.with_verbose();
        }
        if self.quiet {
            config = config.with_quiet();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Run a scan end to end: configure, resolve, probe, report.
pub async fn execute(args: Args) -> anyhow::Result<ExitCode> {
    let settings = AppSettings::load(args.config.as_deref())?;
    let config = args.to_config(&settings)?;
    debug!(?config, "scan configuration");

    let target = ScanTarget::resolve(&config.host)
        .await
        .map_err(ScanError::from)?;

    let show_banner =
        !config.quiet && config.format == OutputFormat::Text && config.output == OutputTarget::Stdout;
    if show_banner {
        output::print_scan_header(
            &target,
            config.ports.count(),
            config.concurrency,
            config.timeout,
        );
    }

    let prober = TcpProber::new(target, config.timeout);
    let report = run_scan(&prober, &config, shutdown_signal()).await?;

    output::write_report(&report, &config)?;

    if let OutputTarget::File(path) = &config.output {
        if !config.quiet {
            output::print_info(&format!(
                "{} results written to {}",
                report.results.len(),
                path.display()
            ));
        }
    }

    match report.outcome {
        ScanOutcome::Complete => Ok(ExitCode::SUCCESS),
        ScanOutcome::Interrupted => {
            output::print_warning("scan interrupted by user");
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
        ScanOutcome::Aborted { reason } => Err(ScanError::ResourceExhausted(reason).into()),
    }
}

/// Completes on Ctrl-C. Never completes if the handler cannot be installed.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
