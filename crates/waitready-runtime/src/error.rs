// Allow unused assignments for diagnostic fields - they're used by the thiserror/miette macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Runtime error type for probe construction and runtime queries
#[derive(Error, Debug, Diagnostic)]
pub enum RuntimeError {
    /// Command execution failed
    #[error("Command '{command}' failed with exit code {exit_code}")]
    #[diagnostic(code(waitready::runtime::command_failed), help("stderr: {stderr}"))]
    CommandFailed {
        #[allow(unused)]
        command: String,
        #[allow(unused)]
        exit_code: i32,
        #[allow(unused)]
        stderr: String,
    },

    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {message}")]
    #[diagnostic(
        code(waitready::runtime::http_client),
        help("The TLS backend may be unavailable on this system. Probe plain http:// endpoints or check the TLS installation")
    )]
    HttpClient {
        #[allow(unused)]
        message: String,
    },

    /// Configuration error raised while building the run
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] waitready_core::WaitError),
}

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

impl RuntimeError {
    pub fn command_failed(
        command: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn http_client(message: impl Into<String>) -> Self {
        Self::HttpClient {
            message: message.into(),
        }
    }
}
