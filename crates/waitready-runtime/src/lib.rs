// Allow unused assignments for diagnostic fields - they're used by the thiserror/miette macros
#![allow(unused_assignments)]

//! Waitready Runtime - the polling engine
//!
//! Probes check one target once, the retrier turns a probe into a
//! bounded-time wait, and the aggregator sequences the waits across all
//! configured targets behind an optional workload-presence gate.

pub mod aggregator;
pub mod command;
pub mod error;
pub mod presence;
pub mod probes;
pub mod report;
pub mod retrier;

#[cfg(test)]
mod test_support;

// Re-export primary types
pub use aggregator::Aggregator;
pub use error::{Result, RuntimeError};
pub use presence::{CliPresence, MockPresence, StaticPresence, WorkloadPresence};
pub use probes::{HttpProbe, NetworkProbeFactory, Probe, ProbeFactory, TcpProbe};
pub use report::{ConsoleReporter, RecordingReporter, ReportEvent, Reporter};
pub use retrier::wait_until_ready;
