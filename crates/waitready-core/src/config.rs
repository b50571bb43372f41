//! Run configuration
//!
//! A [`ReadinessConfig`] is built once at startup, either from one of the
//! built-in profiles or from a YAML target file, and handed to the
//! aggregator by reference. Nothing in it changes during a run.

use crate::error::{Result, WaitError};
use crate::types::{PollPolicy, ShortCircuit, Target};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OPAC_URL: &str = "http://localhost:8080";
pub const DEFAULT_INTRA_URL: &str = "http://localhost:8081";
pub const DEFAULT_PLACK_INTRA_URL: &str = "http://localhost:8082";
pub const DEFAULT_SIP_HOST: &str = "localhost";
pub const DEFAULT_SIP_PORT: u16 = 6001;
/// The SIP wait always ran with its own retry period
pub const DEFAULT_SIP_DEADLINE_SECS: u64 = 200;

/// Everything the aggregator needs for one run
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Checked strictly in this order
    pub targets: Vec<Target>,
    pub policy: PollPolicy,
    pub short_circuit: ShortCircuit,
    /// Container that must be running before any target is probed
    pub workload: Option<String>,
}

impl ReadinessConfig {
    /// A validated config; an empty target list is rejected
    pub fn new(targets: Vec<Target>, policy: PollPolicy, short_circuit: ShortCircuit) -> Result<Self> {
        if targets.is_empty() {
            return Err(WaitError::NoTargets);
        }
        Ok(Self {
            targets,
            policy,
            short_circuit,
            workload: None,
        })
    }

    /// OPAC first as the gate, then both intranet endpoints and the SIP socket
    pub fn services_profile(policy: PollPolicy) -> Result<Self> {
        let targets = vec![
            Target::http("OPAC", DEFAULT_OPAC_URL)?,
            Target::http("INTRA", DEFAULT_INTRA_URL)?,
            Target::http("Plack INTRA", DEFAULT_PLACK_INTRA_URL)?,
            Target::tcp("SIP SERVER", DEFAULT_SIP_HOST, DEFAULT_SIP_PORT)?
                .with_deadline(Duration::from_secs(DEFAULT_SIP_DEADLINE_SECS)),
        ];
        Self::new(targets, policy, ShortCircuit::FirstTarget)
    }

    /// Container gate plus OPAC and INTRA; any failure stops the run
    pub fn container_profile(workload: impl Into<String>, policy: PollPolicy) -> Result<Self> {
        let targets = vec![
            Target::http("OPAC", DEFAULT_OPAC_URL)?,
            Target::http("INTRA", DEFAULT_INTRA_URL)?,
        ];
        Ok(Self::new(targets, policy, ShortCircuit::AnyFailure)?.with_workload(workload))
    }

    pub fn with_workload(mut self, workload: impl Into<String>) -> Self {
        self.workload = Some(workload.into());
        self
    }

    pub fn with_short_circuit(mut self, short_circuit: ShortCircuit) -> Self {
        self.short_circuit = short_circuit;
        self
    }

    /// Replace the target list (and the policy, if the file names one)
    pub fn with_target_file(mut self, file: TargetFile) -> Self {
        self.targets = file.targets;
        if let Some(short_circuit) = file.short_circuit {
            self.short_circuit = short_circuit;
        }
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTargetFile {
    #[serde(default)]
    short_circuit: Option<ShortCircuit>,
    targets: Vec<RawTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    name: String,
    #[serde(default)]
    http: Option<String>,
    #[serde(default)]
    tcp: Option<String>,
    #[serde(default)]
    deadline_secs: Option<u64>,
}

/// Validated contents of a YAML target file
#[derive(Debug, Clone)]
pub struct TargetFile {
    pub targets: Vec<Target>,
    pub short_circuit: Option<ShortCircuit>,
}

impl TargetFile {
    /// Read and validate a target file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let data = std::fs::read_to_string(path)
            .map_err(|e| WaitError::target_file_unreadable(&label, e))?;
        Self::parse(&data, &label)
    }

    /// Validate YAML text; `label` names the source in error messages
    pub fn parse(data: &str, label: &str) -> Result<Self> {
        let raw: RawTargetFile = serde_yaml::from_str(data)
            .map_err(|e| WaitError::target_file_malformed(label, e.to_string()))?;

        if raw.targets.is_empty() {
            return Err(WaitError::NoTargets);
        }

        let targets = raw
            .targets
            .into_iter()
            .map(RawTarget::into_target)
            .collect::<Result<Vec<_>>>()?;

        debug!("Loaded {} targets from {}", targets.len(), label);

        Ok(Self {
            targets,
            short_circuit: raw.short_circuit,
        })
    }
}

impl RawTarget {
    fn into_target(self) -> Result<Target> {
        let target = match (self.http, self.tcp) {
            (Some(url), None) => Target::http(self.name, &url)?,
            (None, Some(addr)) => Target::tcp_from_str(self.name, &addr)?,
            (Some(_), Some(_)) => {
                return Err(WaitError::invalid_target(
                    self.name,
                    "both `http` and `tcp` are set",
                    "Keep exactly one of `http` or `tcp` per target",
                ))
            }
            (None, None) => {
                return Err(WaitError::invalid_target(
                    self.name,
                    "neither `http` nor `tcp` is set",
                    "Add `http: <url>` or `tcp: <host>:<port>`",
                ))
            }
        };

        Ok(match self.deadline_secs {
            Some(secs) => target.with_deadline(Duration::from_secs(secs)),
            None => target,
        })
    }
}
