use crate::error::{Result, WaitError};
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default wait between two probe attempts
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Default total time allotted to one target
pub const DEFAULT_DEADLINE_SECS: u64 = 300;

/// Process exit code when every checked target is ready
pub const EXIT_READY: i32 = 0;
/// Process exit code for any failure (usage, configuration, readiness)
pub const EXIT_NOT_READY: i32 = 1;

/// Which liveness signature a target exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    HttpEndpoint,
    TcpSocket,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::HttpEndpoint => write!(f, "http"),
            TargetKind::TcpSocket => write!(f, "tcp"),
        }
    }
}

/// Where a target is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddress {
    Http(Url),
    Tcp { host: String, port: u16 },
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetAddress::Http(url) => write!(f, "{}", url),
            TargetAddress::Tcp { host, port } if host.contains(':') => {
                write!(f, "[{}]:{}", host, port)
            }
            TargetAddress::Tcp { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}

/// A named endpoint or socket to be checked
///
/// Constructed once from configuration; the constructors validate the
/// address so that a `Target` in hand is always well-formed for its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: String,
    address: TargetAddress,
    deadline: Option<Duration>,
}

impl Target {
    /// An HTTP endpoint; `url` must be an absolute `http`/`https` URL with a host
    pub fn http(name: impl Into<String>, url: &str) -> Result<Self> {
        let name = name.into();
        let parsed = Url::parse(url).map_err(|e| {
            WaitError::invalid_target(
                &name,
                format!("'{}' is not a valid URL: {}", url, e),
                "Use an absolute URL such as http://localhost:8080",
            )
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(WaitError::invalid_target(
                &name,
                format!("unsupported scheme '{}'", parsed.scheme()),
                "Only http:// and https:// endpoints can be probed; use a tcp target for other protocols",
            ));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(WaitError::invalid_target(
                &name,
                format!("URL '{}' has no host", url),
                "Include a host, e.g. http://localhost:8080",
            ));
        }

        Ok(Self {
            name,
            address: TargetAddress::Http(parsed),
            deadline: None,
        })
    }

    /// A bare listening socket
    pub fn tcp(name: impl Into<String>, host: impl Into<String>, port: u16) -> Result<Self> {
        let name = name.into();
        let host = host.into();
        if host.trim().is_empty() {
            return Err(WaitError::invalid_target(
                &name,
                "empty host",
                "Specify the host to connect to, e.g. localhost",
            ));
        }
        if port == 0 {
            return Err(WaitError::invalid_target(
                &name,
                "port 0 cannot be connected to",
                "Specify the port the service listens on, e.g. 6001",
            ));
        }

        Ok(Self {
            name,
            address: TargetAddress::Tcp { host, port },
            deadline: None,
        })
    }

    /// A TCP target from a `host:port` string (`[v6addr]:port` for IPv6)
    pub fn tcp_from_str(name: impl Into<String>, addr: &str) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| {
            WaitError::invalid_target(&name, reason, "Use the form host:port, e.g. localhost:6001")
        };

        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| invalid(format!("'{}' has no port", addr)))?;
        let port: u16 = port
            .parse()
            .map_err(|_| invalid(format!("'{}' is not a valid port", port)))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');

        Self::tcp(name.clone(), host, port)
    }

    /// Give this target its own deadline instead of the run-wide one
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TargetKind {
        match self.address {
            TargetAddress::Http(_) => TargetKind::HttpEndpoint,
            TargetAddress::Tcp { .. } => TargetKind::TcpSocket,
        }
    }

    pub fn address(&self) -> &TargetAddress {
        &self.address
    }

    pub fn deadline_override(&self) -> Option<Duration> {
        self.deadline
    }

    /// The poll policy that applies to this target
    pub fn effective_policy(&self, policy: &PollPolicy) -> PollPolicy {
        match self.deadline {
            Some(deadline) => PollPolicy {
                deadline,
                ..*policy
            },
            None => *policy,
        }
    }
}

/// Timing of the retry loop, shared read-only across all targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed wait between successive attempts
    pub poll_interval: Duration,
    /// Time after which no further attempt is started
    pub deadline: Duration,
}

impl PollPolicy {
    pub fn new(poll_interval: Duration, deadline: Duration) -> Self {
        Self {
            poll_interval,
            deadline,
        }
    }

    pub fn from_secs(poll_interval: u64, deadline: u64) -> Self {
        Self::new(
            Duration::from_secs(poll_interval),
            Duration::from_secs(deadline),
        )
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_secs(DEFAULT_POLL_INTERVAL_SECS, DEFAULT_DEADLINE_SECS)
    }
}

/// When the aggregator stops probing the remaining targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortCircuit {
    /// Stop only if the first target fails; later failures accumulate
    #[default]
    FirstTarget,
    /// Stop at the first failing target, whatever its position
    AnyFailure,
    /// Always probe every target
    Never,
}

impl ShortCircuit {
    /// Whether a failure of the target at `index` ends the run
    pub fn stops_after(&self, index: usize) -> bool {
        match self {
            ShortCircuit::FirstTarget => index == 0,
            ShortCircuit::AnyFailure => true,
            ShortCircuit::Never => false,
        }
    }
}

impl fmt::Display for ShortCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortCircuit::FirstTarget => write!(f, "first-target"),
            ShortCircuit::AnyFailure => write!(f, "any-failure"),
            ShortCircuit::Never => write!(f, "never"),
        }
    }
}

impl FromStr for ShortCircuit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first-target" => Ok(ShortCircuit::FirstTarget),
            "any-failure" => Ok(ShortCircuit::AnyFailure),
            "never" => Ok(ShortCircuit::Never),
            other => Err(format!(
                "unknown short-circuit policy '{}' (expected first-target, any-failure or never)",
                other
            )),
        }
    }
}

/// Result of a single probe attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub succeeded: bool,
    /// HTTP status code, or 1/0 for TCP connect/no connect; 0 on transport failure
    pub raw_status: u16,
}

impl ProbeOutcome {
    /// Only an exact 200 counts as ready; redirects are not followed
    pub fn from_http_status(status: u16) -> Self {
        Self {
            succeeded: status == 200,
            raw_status: status,
        }
    }

    pub fn transport_failure() -> Self {
        Self {
            succeeded: false,
            raw_status: 0,
        }
    }

    pub fn connected() -> Self {
        Self {
            succeeded: true,
            raw_status: 1,
        }
    }
}

/// Outcome of waiting for one target
#[derive(Debug, Clone)]
pub struct RetryResult<'a> {
    pub target: &'a Target,
    pub succeeded: bool,
    pub elapsed: Duration,
    pub attempts: u32,
    pub last_status: u16,
}

/// One line of a run report
#[derive(Debug, Clone)]
pub enum ReportEntry<'a> {
    Target(RetryResult<'a>),
    /// Synthetic failure: the expected workload was not running
    WorkloadAbsent { workload: String },
}

impl ReportEntry<'_> {
    pub fn succeeded(&self) -> bool {
        match self {
            ReportEntry::Target(result) => result.succeeded,
            ReportEntry::WorkloadAbsent { .. } => false,
        }
    }
}

/// Everything one invocation observed
#[derive(Debug, Clone, Default)]
pub struct RunReport<'a> {
    pub entries: Vec<ReportEntry<'a>>,
    /// Targets never probed because the run was short-circuited
    pub skipped: Vec<&'a Target>,
}

impl<'a> RunReport<'a> {
    pub fn workload_absent(workload: impl Into<String>, skipped: Vec<&'a Target>) -> Self {
        Self {
            entries: vec![ReportEntry::WorkloadAbsent {
                workload: workload.into(),
            }],
            skipped,
        }
    }

    pub fn all_ready(&self) -> bool {
        self.entries.iter().all(ReportEntry::succeeded)
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_ready() {
            EXIT_READY
        } else {
            EXIT_NOT_READY
        }
    }

    /// Per-target results, in probing order
    pub fn results(&self) -> impl Iterator<Item = &RetryResult<'a>> {
        self.entries.iter().filter_map(|entry| match entry {
            ReportEntry::Target(result) => Some(result),
            ReportEntry::WorkloadAbsent { .. } => None,
        })
    }
}
