use clap::Parser;
use portsweep::cli::{self, Args};
use portsweep::output::print_error;
use portsweep::ScanError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match cli::execute(args).await {
        Ok(code) => code,
        Err(err) => {
            print_error(&format!("{err:#}"));
            let code = err.downcast_ref::<ScanError>().map_or(1, ScanError::exit_code);
            ExitCode::from(code)
        }
    }
}

/// Log to stderr so stdout stays clean for CSV/JSON. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
