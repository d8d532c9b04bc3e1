//! TCP connect prober.
//!
//! Performs standard TCP connect probes using the operating system's
//! socket API. The handshake is completed and the socket closed at once;
//! no data is exchanged.

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{ProbeResult, ProbeStatus, Prober};
use crate::services::service_hint;
use crate::types::{Port, ScanTarget};
use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};

/// TCP connect prober.
///
/// Does not require elevated privileges. Each probe opens one socket and
/// is bounded by the configured timeout.
pub struct TcpProber {
    target: ScanTarget,
    timeout: Duration,
}

impl TcpProber {
    /// Create a prober for an already-resolved target.
    pub fn new(target: ScanTarget, timeout: Duration) -> Self {
        Self { target, timeout }
    }
}

#[async_trait]
impl Prober for TcpProber {
    fn target(&self) -> &ScanTarget {
        &self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self, port: Port) -> ScanResult<ProbeResult> {
        let addr = SocketAddr::new(self.target.ip, port.as_u16());

        let result = match timed_connect(self.timeout, TcpStream::connect(addr)).await? {
            Ok(elapsed) => ProbeResult::new(&self.target.original, port, ProbeStatus::Open)
                .with_service(service_hint(port))
                .with_latency(elapsed),
            Err(status) => ProbeResult::new(&self.target.original, port, status),
        };

        Ok(result)
    }
}

/// Drive one connect attempt under `limit`.
///
/// Returns the handshake latency when the connect succeeds (the stream is
/// closed immediately), or the non-open status the failure maps to.
async fn timed_connect<F, S>(
    limit: Duration,
    connect: F,
) -> ScanResult<Result<Duration, ProbeStatus>>
where
    F: Future<Output = io::Result<S>>,
{
    let start = Instant::now();
    match timeout(limit, connect).await {
        Ok(Ok(stream)) => {
            let elapsed = start.elapsed();
            drop(stream);
            Ok(Ok(elapsed))
        }
        Ok(Err(e)) => classify_connect_error(&e).map(Err),
        Err(_) => Ok(Err(ProbeStatus::Filtered)),
    }
}

/// Map a failed connect to a port status, or to a scan-level error when
/// the failure is about local resources rather than the remote port.
fn classify_connect_error(err: &io::Error) -> ScanResult<ProbeStatus> {
    if is_resource_exhaustion(err) {
        return Err(ScanError::ResourceExhausted(err.to_string()));
    }

    Ok(match err.kind() {
        io::ErrorKind::ConnectionRefused => ProbeStatus::Closed,
        io::ErrorKind::TimedOut
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable => ProbeStatus::Filtered,
        _ => ProbeStatus::Closed,
    })
}

#[cfg(unix)]
fn is_resource_exhaustion(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EMFILE | libc::ENFILE | libc::ENOBUFS | libc::ENOMEM | libc::EADDRNOTAVAIL)
    )
}

#[cfg(not(unix))]
fn is_resource_exhaustion(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::OutOfMemory
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::TcpListener;

    fn localhost() -> ScanTarget {
        ScanTarget::new("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let prober = TcpProber::new(localhost(), Duration::from_secs(2));
        let result = prober.probe(port).await.unwrap();

        assert_eq!(result.status, ProbeStatus::Open);
        assert_eq!(result.host, "localhost");
        assert!(result.latency_ms.is_some());
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let prober = TcpProber::new(localhost(), Duration::from_secs(2));
        let result = prober.probe(Port::new(port).unwrap()).await.unwrap();

        assert_eq!(result.status, ProbeStatus::Closed);
        assert_eq!(result.latency_ms, None);
        assert_eq!(result.service, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_connect_times_out_as_filtered() {
        let limit = Duration::from_millis(200);
        let start = Instant::now();

        let outcome = timed_connect(limit, std::future::pending::<io::Result<TcpStream>>())
            .await
            .unwrap();

        assert_eq!(outcome, Err(ProbeStatus::Filtered));
        assert!(start.elapsed() >= limit);
        assert!(start.elapsed() < limit + Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_connect_error_is_classified_not_timed_out() {
        let refused = async { Err::<TcpStream, _>(io::Error::from(io::ErrorKind::ConnectionRefused)) };
        let outcome = timed_connect(Duration::from_secs(5), refused).await.unwrap();
        assert_eq!(outcome, Err(ProbeStatus::Closed));
    }

    #[test]
    fn test_classify_connect_error() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(classify_connect_error(&refused).unwrap(), ProbeStatus::Closed);

        let unreachable = io::Error::from(io::ErrorKind::HostUnreachable);
        assert_eq!(classify_connect_error(&unreachable).unwrap(), ProbeStatus::Filtered);
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_fd_exhaustion() {
        let emfile = io::Error::from_raw_os_error(libc::EMFILE);
        assert!(matches!(
            classify_connect_error(&emfile),
            Err(ScanError::ResourceExhausted(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_address_exhaustion() {
        // Out of ephemeral ports: a local failure, not a closed remote port.
        let no_addr = io::Error::from_raw_os_error(libc::EADDRNOTAVAIL);
        assert!(matches!(
            classify_connect_error(&no_addr),
            Err(ScanError::ResourceExhausted(_))
        ));
    }
}
