//! Single-attempt liveness checks
//!
//! A [`Probe`] performs exactly one check against one target and reduces
//! the result to a [`ProbeOutcome`]. Transport errors never escape a probe;
//! they become a failed outcome with `raw_status == 0`.

pub mod http;
pub mod tcp;

pub use http::HttpProbe;
pub use tcp::{TcpProbe, TCP_CONNECT_TIMEOUT};

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use waitready_core::{PollPolicy, ProbeOutcome, Target, TargetAddress};

/// One liveness check against one target
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> ProbeOutcome;
}

/// Builds the probe for each configured target
///
/// The aggregator asks for every probe up front, so a target that cannot be
/// probed is reported before any traffic is sent.
pub trait ProbeFactory {
    fn build(&self, target: &Target, policy: &PollPolicy) -> Result<Box<dyn Probe>>;
}

/// Real HTTP and TCP probes
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkProbeFactory;

impl ProbeFactory for NetworkProbeFactory {
    fn build(&self, target: &Target, policy: &PollPolicy) -> Result<Box<dyn Probe>> {
        match target.address() {
            TargetAddress::Http(url) => Ok(Box::new(HttpProbe::new(
                url.clone(),
                http_timeout(policy),
            )?)),
            TargetAddress::Tcp { host, port } => Ok(Box::new(TcpProbe::new(
                host.clone(),
                *port,
                TCP_CONNECT_TIMEOUT,
            ))),
        }
    }
}

/// Transport bound for one HTTP attempt: the poll interval, but never below 1s
pub fn http_timeout(policy: &PollPolicy) -> Duration {
    policy.poll_interval.max(Duration::from_secs(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_timeout_follows_interval() {
        assert_eq!(
            http_timeout(&PollPolicy::from_secs(5, 300)),
            Duration::from_secs(5)
        );
        assert_eq!(
            http_timeout(&PollPolicy::from_secs(0, 300)),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_factory_builds_for_each_kind() {
        let factory = NetworkProbeFactory;
        let policy = PollPolicy::default();

        let http = Target::http("OPAC", "http://localhost:8080").unwrap();
        assert!(factory.build(&http, &policy).is_ok());

        let tcp = Target::tcp("SIP SERVER", "localhost", 6001).unwrap();
        assert!(factory.build(&tcp, &policy).is_ok());
    }
}
