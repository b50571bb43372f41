//! User-facing progress output
//!
//! Standard output is the report channel: the resolved configuration, one
//! `.` per failed attempt while waiting, and a verdict line per target.
//! Diagnostics go through `tracing` instead.

use std::io::{self, Write};
use waitready_core::{ProbeOutcome, ReadinessConfig, RetryResult, Target};

/// Sink for the progress of a run
pub trait Reporter: Send {
    /// Called once before anything is probed
    fn configuration(&mut self, config: &ReadinessConfig);

    fn workload_checked(&mut self, workload: &str, present: bool);

    /// One failed probe attempt
    fn attempt_failed(&mut self, target: &Target, outcome: &ProbeOutcome);

    /// The retry loop for `target` has ended
    fn wait_finished(&mut self, target: &Target);

    fn target_finished(&mut self, result: &RetryResult<'_>);
}

/// Writes the classic `INFO:`/`ERROR:` lines
pub struct ConsoleReporter<W: Write + Send = io::Stdout> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// Output errors (closed pipe and the like) must not change the verdict, so
// they are dropped.
impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn configuration(&mut self, config: &ReadinessConfig) {
        for target in &config.targets {
            let _ = writeln!(self.out, "INFO: {}:\t{}", target.name(), target.address());
        }
        if let Some(workload) = &config.workload {
            let _ = writeln!(self.out, "INFO: container:\t{}", workload);
        }
        let _ = writeln!(
            self.out,
            "INFO: poll interval:\t{}s",
            config.policy.poll_interval.as_secs()
        );
        let _ = writeln!(self.out, "INFO: deadline:\t{}s", config.policy.deadline.as_secs());
        for target in &config.targets {
            if let Some(deadline) = target.deadline_override() {
                let _ = writeln!(
                    self.out,
                    "INFO: deadline for {}:\t{}s",
                    target.name(),
                    deadline.as_secs()
                );
            }
        }
        let _ = writeln!(self.out);
    }

    fn workload_checked(&mut self, workload: &str, present: bool) {
        if present {
            let _ = writeln!(self.out, "INFO: container {} is running", workload);
        } else {
            let _ = writeln!(self.out, "ERROR: container {} is NOT running", workload);
        }
    }

    fn attempt_failed(&mut self, _target: &Target, _outcome: &ProbeOutcome) {
        let _ = write!(self.out, ".");
        let _ = self.out.flush();
    }

    fn wait_finished(&mut self, _target: &Target) {
        let _ = writeln!(self.out);
    }

    fn target_finished(&mut self, result: &RetryResult<'_>) {
        if result.succeeded {
            let _ = writeln!(self.out, "INFO: {} is running", result.target.name());
        } else {
            let _ = writeln!(self.out, "ERROR: {} is NOT running", result.target.name());
        }
        let _ = self.out.flush();
    }
}

/// Event recorded by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Configuration,
    WorkloadChecked { workload: String, present: bool },
    AttemptFailed { target: String, raw_status: u16 },
    WaitFinished { target: String },
    TargetFinished { target: String, succeeded: bool },
}

/// Keeps every event in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<ReportEvent>,
}

impl RecordingReporter {
    pub fn failed_attempts(&self, target: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ReportEvent::AttemptFailed { target: t, .. } if t == target))
            .count()
    }
}

impl Reporter for RecordingReporter {
    fn configuration(&mut self, _config: &ReadinessConfig) {
        self.events.push(ReportEvent::Configuration);
    }

    fn workload_checked(&mut self, workload: &str, present: bool) {
        self.events.push(ReportEvent::WorkloadChecked {
            workload: workload.to_string(),
            present,
        });
    }

    fn attempt_failed(&mut self, target: &Target, outcome: &ProbeOutcome) {
        self.events.push(ReportEvent::AttemptFailed {
            target: target.name().to_string(),
            raw_status: outcome.raw_status,
        });
    }

    fn wait_finished(&mut self, target: &Target) {
        self.events.push(ReportEvent::WaitFinished {
            target: target.name().to_string(),
        });
    }

    fn target_finished(&mut self, result: &RetryResult<'_>) {
        self.events.push(ReportEvent::TargetFinished {
            target: result.target.name().to_string(),
            succeeded: result.succeeded,
        });
    }
}
