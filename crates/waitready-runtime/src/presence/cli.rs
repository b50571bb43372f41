use super::{matches_workload, WorkloadPresence};
use crate::command;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Lists running containers through a container runtime CLI
///
/// Runs `<program> ps --format {{.Names}}` by default, which both `docker`
/// and `podman` understand.
#[derive(Debug, Clone)]
pub struct CliPresence {
    program: String,
    args: Vec<String>,
}

impl CliPresence {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["ps".to_string(), "--format".to_string(), "{{.Names}}".to_string()],
        }
    }

    pub fn docker() -> Self {
        Self::new("docker")
    }

    /// Replace the listing arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Names from a listing: one container per line, aliases comma separated
pub fn parse_names(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

#[async_trait]
impl WorkloadPresence for CliPresence {
    async fn is_present(&self, name: &str) -> bool {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        match command::exec(&self.program, &args).await {
            Ok(output) => {
                let names = parse_names(&output.stdout);
                debug!("{} reports {} running workload(s)", self.program, names.len());
                names.iter().any(|candidate| matches_workload(candidate, name))
            }
            Err(e) => {
                warn!("Failed to list workloads with {}: {}", self.program, e);
                false
            }
        }
    }
}
