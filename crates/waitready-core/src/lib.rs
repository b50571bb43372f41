//! Waitready Core - Data model and configuration for readiness polling
//!
//! This crate provides:
//! - Targets, poll policies and the outcome types of a run
//! - Error types with miette diagnostics
//! - Built-in target profiles and YAML target-file loading

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ReadinessConfig, TargetFile};
pub use error::{Result, WaitError};
pub use types::{
    PollPolicy, ProbeOutcome, ReportEntry, RetryResult, RunReport, ShortCircuit, Target,
    TargetAddress, TargetKind, DEFAULT_DEADLINE_SECS, DEFAULT_POLL_INTERVAL_SECS, EXIT_NOT_READY,
    EXIT_READY,
};
