use super::Probe;
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use waitready_core::ProbeOutcome;

/// Connect bound for a TCP probe, independent of the poll deadline
pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Checks that something accepts connections on `host:port`
///
/// The connection is closed as soon as it is established; no data is
/// exchanged.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn check(&self) -> ProbeOutcome {
        match timeout(self.timeout, TcpStream::connect((self.host.as_str(), self.port))).await {
            Ok(Ok(_stream)) => ProbeOutcome::connected(),
            Ok(Err(e)) => {
                debug!("TCP probe to {} failed: {}", self.address(), e);
                ProbeOutcome::transport_failure()
            }
            Err(_) => {
                debug!(
                    "TCP probe to {} timed out after {:?}",
                    self.address(),
                    self.timeout
                );
                ProbeOutcome::transport_failure()
            }
        }
    }
}
