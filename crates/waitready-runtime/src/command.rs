use crate::error::{Result, RuntimeError};
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` to completion, failing on spawn errors and non-zero exits
///
/// Stdin is closed so a runtime CLI prompting for input cannot hang the run.
pub async fn exec(program: &str, args: &[&str]) -> Result<CommandOutput> {
    let command_line = || format!("{} {}", program, args.join(" "));
    debug!("Executing: {}", command_line());

    let output = Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| RuntimeError::command_failed(command_line(), -1, e.to_string()))?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !output.status.success() {
        // Killed by a signal has no exit code
        let exit_code = output.status.code().unwrap_or(-1);
        return Err(RuntimeError::command_failed(command_line(), exit_code, stderr));
    }

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exec_captures_stdout() {
        let output = exec("echo", &["koha_docker"]).await.unwrap();
        assert_eq!(output.stdout.trim(), "koha_docker");
    }

    #[tokio::test]
    async fn test_exec_nonzero_exit_is_error() {
        let err = exec("sh", &["-c", "echo oops >&2; exit 3"]).await.unwrap_err();
        match err {
            RuntimeError::CommandFailed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, 3);
                assert_eq!(stderr, "oops");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exec_missing_program_is_error() {
        let err = exec("waitready-no-such-binary", &[]).await.unwrap_err();
        assert!(matches!(err, RuntimeError::CommandFailed { exit_code: -1, .. }));
    }
}
