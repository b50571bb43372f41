// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for building a readiness run
///
/// Everything in here is a configuration problem detected before any probe
/// is sent. Transport failures never become a `WaitError`.
#[derive(Error, Debug, Diagnostic)]
pub enum WaitError {
    /// A target address is malformed for its kind
    #[error("Invalid target '{name}': {reason}")]
    #[diagnostic(code(waitready::invalid_target), help("{suggestion}"))]
    InvalidTarget {
        #[allow(unused)]
        name: String,
        #[allow(unused)]
        reason: String,
        #[allow(unused)]
        suggestion: String,
    },

    /// The configured target list is empty
    #[error("No targets configured")]
    #[diagnostic(
        code(waitready::no_targets),
        help("Add at least one entry under `targets:` in the target file")
    )]
    NoTargets,

    /// Target file could not be read
    #[error("Failed to read target file '{path}'")]
    #[diagnostic(
        code(waitready::target_file_unreadable),
        help("Check that the file exists and is readable by the current user")
    )]
    TargetFileUnreadable {
        #[allow(unused)]
        path: String,
        #[source]
        #[allow(unused)]
        source: std::io::Error,
    },

    /// Target file is not valid YAML for the target schema
    #[error("Malformed target file '{path}': {message}")]
    #[diagnostic(
        code(waitready::target_file_malformed),
        help("Each entry needs a `name` and exactly one of `http: <url>` or `tcp: <host>:<port>`")
    )]
    TargetFileMalformed {
        #[allow(unused)]
        path: String,
        #[allow(unused)]
        message: String,
    },
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, WaitError>;

impl WaitError {
    pub fn invalid_target(
        name: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::InvalidTarget {
            name: name.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn target_file_unreadable(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::TargetFileUnreadable {
            path: path.into(),
            source,
        }
    }

    pub fn target_file_malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TargetFileMalformed {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WaitError::invalid_target("OPAC", "missing host", "use http://host:port");
        assert!(matches!(err, WaitError::InvalidTarget { .. }));
        assert_eq!(err.to_string(), "Invalid target 'OPAC': missing host");
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = WaitError::NoTargets;
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("waitready::no_targets"));

        let err = WaitError::target_file_malformed("targets.yaml", "bad indent");
        assert!(err.help().is_some());
    }
}
