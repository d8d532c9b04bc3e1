//! Scanner module - coordinates concurrent port probes.
//!
//! [`run_scan`] drives a [`Prober`] over every requested port with at most
//! `concurrency` probes in flight, collecting results in completion order
//! and returning them as a [`ScanReport`] sorted by port.

pub mod tcp;
pub mod traits;

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::types::ScanTarget;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use tcp::TcpProber;
pub use traits::{ProbeResult, ProbeStatus, Prober};

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every requested port produced a result.
    Complete,
    /// Cancelled from outside (e.g. Ctrl-C); in-flight probes were dropped.
    Interrupted,
    /// A probe hit an infrastructural failure; remaining probes were dropped.
    Aborted { reason: String },
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Aborted { reason } => write!(f, "aborted: {}", reason),
        }
    }
}

/// Complete (or partial) scan results.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub target: ScanTarget,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    /// Number of ports requested.
    pub requested: usize,
    /// One result per probed port, ascending by port.
    pub results: Vec<ProbeResult>,
    pub outcome: ScanOutcome,
}

impl ScanReport {
    /// Whether every requested port was probed.
    pub fn is_complete(&self) -> bool {
        self.outcome == ScanOutcome::Complete
    }

    /// Number of results with the given status.
    pub fn count(&self, status: ProbeStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Results with the given status, ascending by port.
    pub fn with_status(&self, status: ProbeStatus) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(move |r| r.status == status)
    }
}

/// Execute a port scan.
///
/// Resolves once `shutdown` completes or every port has been probed,
/// whichever comes first. Already-collected results are kept in both
/// cases, and also when a probe fails with a scan-level error.
pub async fn run_scan<F>(
    prober: &dyn Prober,
    config: &ScanConfig,
    shutdown: F,
) -> ScanResult<ScanReport>
where
    F: Future<Output = ()>,
{
    if config.concurrency == 0 {
        return Err(ScanError::InvalidConfig(
            "concurrency must be at least 1".into(),
        ));
    }

    let ports = config.ports.to_ports();
    let requested = ports.len();
    let started_at = Utc::now();
    let start = Instant::now();
    let progress = progress_bar(requested as u64, config.quiet);

    debug!(
        host = %prober.target(),
        ports = requested,
        concurrency = config.concurrency,
        timeout_ms = prober.timeout().as_millis() as u64,
        "starting scan"
    );

    let mut probes = stream::iter(ports)
        .map(|port| prober.probe(port))
        .buffer_unordered(config.concurrency);
    tokio::pin!(shutdown);

    // Only this loop touches `results`, so completions need no lock.
    let mut results = Vec::with_capacity(requested);
    let outcome = loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                warn!(probed = results.len(), requested, "scan interrupted");
                break ScanOutcome::Interrupted;
            }
            next = probes.next() => match next {
                Some(Ok(result)) => {
                    progress.inc(1);
                    if result.is_open() {
                        progress.set_message(format!("open: {}", result.port));
                    }
                    if config.verbose {
                        progress.suspend(|| {
                            info!(
                                port = %result.port,
                                status = %result.status,
                                latency_ms = ?result.latency_ms,
                                "probe complete"
                            )
                        });
                    }
                    results.push(result);
                }
                Some(Err(err)) => {
                    warn!(error = %err, probed = results.len(), "aborting scan");
                    break ScanOutcome::Aborted { reason: err.to_string() };
                }
                None => break ScanOutcome::Complete,
            }
        }
    };
    drop(probes);
    progress.finish_and_clear();

    results.sort_by_key(|r| r.port);

    Ok(ScanReport {
        target: prober.target().clone(),
        started_at,
        duration: start.elapsed(),
        requested,
        results,
        outcome,
    })
}

fn progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Port, PortSpec};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Deterministic prober: even ports open, odd ports closed.
    struct FakeProber {
        target: ScanTarget,
        delay: fn(u16) -> Duration,
        fail_on: Option<u16>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        completed: Mutex<Vec<u16>>,
    }

    impl FakeProber {
        fn new(delay: fn(u16) -> Duration) -> Self {
            Self {
                target: ScanTarget::new("h", IpAddr::V4(Ipv4Addr::LOCALHOST)),
                delay,
                fail_on: None,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                completed: Mutex::new(Vec::new()),
            }
        }

        fn expected(port: u16) -> ProbeStatus {
            if port % 2 == 0 {
                ProbeStatus::Open
            } else {
                ProbeStatus::Closed
            }
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        fn target(&self) -> &ScanTarget {
            &self.target
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn probe(&self, port: Port) -> ScanResult<ProbeResult> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep((self.delay)(port.as_u16())).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on == Some(port.as_u16()) {
                return Err(ScanError::ResourceExhausted("too many open files".into()));
            }
            self.completed.lock().unwrap().push(port.as_u16());
            Ok(ProbeResult::new("h", port, Self::expected(port.as_u16())))
        }
    }

    fn no_delay(_: u16) -> Duration {
        Duration::ZERO
    }

    fn config(ports: &str, concurrency: usize) -> ScanConfig {
        let ports: PortSpec = ports.parse().unwrap();
        ScanConfig::new("h", ports)
            .with_concurrency(concurrency)
            .with_quiet()
    }

    #[tokio::test]
    async fn test_one_result_per_port_for_any_concurrency() {
        let expected: HashSet<(u16, ProbeStatus)> =
            (1..=8).map(|p| (p, FakeProber::expected(p))).collect();

        for concurrency in 1..=8 {
            let prober = FakeProber::new(no_delay);
            let report = run_scan(&prober, &config("1-8", concurrency), std::future::pending())
                .await
                .unwrap();

            assert!(report.is_complete());
            assert_eq!(report.requested, 8);
            assert_eq!(report.results.len(), 8);
            let got: HashSet<(u16, ProbeStatus)> = report
                .results
                .iter()
                .map(|r| (r.port.as_u16(), r.status))
                .collect();
            assert_eq!(got, expected, "concurrency {concurrency}");
        }
    }

    #[tokio::test]
    async fn test_in_flight_bound() {
        let prober = FakeProber::new(|_| Duration::from_millis(5));
        let report = run_scan(&prober, &config("1-30", 3), std::future::pending())
            .await
            .unwrap();

        assert_eq!(report.results.len(), 30);
        let max = prober.max_in_flight.load(Ordering::SeqCst);
        assert!((1..=3).contains(&max), "max in flight was {max}");
    }

    #[tokio::test]
    async fn test_completion_order_is_unordered_report_is_sorted() {
        // Later ports finish first.
        let prober = FakeProber::new(|p| Duration::from_millis(u64::from(6 - p) * 20));
        let report = run_scan(&prober, &config("1-5", 5), std::future::pending())
            .await
            .unwrap();

        assert_eq!(*prober.completed.lock().unwrap(), vec![5, 4, 3, 2, 1]);
        let ports: Vec<u16> = report.results.iter().map(|r| r.port.as_u16()).collect();
        assert_eq!(ports, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.count(ProbeStatus::Open), 2);
        assert_eq!(report.count(ProbeStatus::Closed), 3);
    }

    #[tokio::test]
    async fn test_cancellation_keeps_partial_results() {
        let prober = FakeProber::new(|_| Duration::from_millis(50));
        let shutdown = tokio::time::sleep(Duration::from_millis(130));
        let report = run_scan(&prober, &config("1-10", 1), shutdown).await.unwrap();

        assert_eq!(report.outcome, ScanOutcome::Interrupted);
        assert!(!report.is_complete());
        assert!(!report.results.is_empty());
        assert!(report.results.len() < 10);
        assert_eq!(report.requested, 10);
    }

    #[tokio::test]
    async fn test_resource_exhaustion_aborts_with_partial_results() {
        let mut prober = FakeProber::new(no_delay);
        prober.fail_on = Some(4);
        let report = run_scan(&prober, &config("1-10", 1), std::future::pending())
            .await
            .unwrap();

        assert!(matches!(report.outcome, ScanOutcome::Aborted { .. }));
        let ports: Vec<u16> = report.results.iter().map(|r| r.port.as_u16()).collect();
        assert_eq!(ports, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_rejected() {
        let prober = FakeProber::new(no_delay);
        let err = run_scan(&prober, &config("1-3", 0), std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)));
        assert!(prober.completed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(ScanOutcome::Complete.to_string(), "complete");
        assert_eq!(
            ScanOutcome::Aborted { reason: "EMFILE".into() }.to_string(),
            "aborted: EMFILE"
        );
    }
}
