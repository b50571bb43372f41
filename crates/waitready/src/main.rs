use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use waitready_core::{
    PollPolicy, ReadinessConfig, ShortCircuit, TargetFile, DEFAULT_DEADLINE_SECS,
    DEFAULT_POLL_INTERVAL_SECS, EXIT_NOT_READY,
};
use waitready_runtime::{Aggregator, CliPresence, ConsoleReporter, NetworkProbeFactory};

#[derive(Parser, Debug)]
#[command(
    name = "waitready",
    version,
    about = "Block until the library stack's web and SIP services are ready"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wait for OPAC, both intranet endpoints and the SIP server
    Services {
        #[command(flatten)]
        timing: Timing,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Require a running container, then wait for OPAC and INTRA
    Container {
        /// Name of the container that must be running
        container_name: String,
        #[command(flatten)]
        timing: Timing,
        #[command(flatten)]
        overrides: Overrides,
        /// Container runtime CLI used to list running containers
        #[arg(long, default_value = "docker", env = "WAITREADY_RUNTIME")]
        runtime: String,
    },
}

#[derive(Args, Debug)]
struct Timing {
    /// Seconds to sleep between retries
    #[arg(value_parser = parse_seconds, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval: u64,
    /// Seconds to keep retrying each target
    #[arg(value_parser = parse_seconds, default_value_t = DEFAULT_DEADLINE_SECS)]
    deadline: u64,
}

#[derive(Args, Debug)]
struct Overrides {
    /// YAML file listing the targets to check instead of the built-in ones
    #[arg(long, value_name = "FILE")]
    targets: Option<PathBuf>,
    /// When to stop after a failure: first-target, any-failure or never
    #[arg(long, value_name = "POLICY")]
    short_circuit: Option<ShortCircuit>,
}

/// Whole seconds, ASCII digits only
fn parse_seconds(value: &str) -> Result<u64, String> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a valid period", value));
    }
    value
        .parse()
        .map_err(|_| format!("'{}' is too large to be a period", value))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<ExitCode> {
    // Diagnostics go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", e.render());
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            // Usage errors are reported on stdout
            print!("{}", e.render());
            return Ok(exit_code(EXIT_NOT_READY));
        }
    };

    let (config, runtime) = build_config(cli.command)?;
    run(&config, runtime).await
}

/// Resolve the subcommand into the run configuration and, for the
/// container variant, the runtime CLI to query
fn build_config(command: Commands) -> miette::Result<(ReadinessConfig, Option<String>)> {
    let (config, overrides, runtime) = match command {
        Commands::Services { timing, overrides } => (
            ReadinessConfig::services_profile(timing.policy())?,
            overrides,
            None,
        ),
        Commands::Container {
            container_name,
            timing,
            overrides,
            runtime,
        } => (
            ReadinessConfig::container_profile(container_name, timing.policy())?,
            overrides,
            Some(runtime),
        ),
    };

    let mut config = match &overrides.targets {
        Some(path) => config.with_target_file(TargetFile::load(path)?),
        None => config,
    };
    if let Some(short_circuit) = overrides.short_circuit {
        config = config.with_short_circuit(short_circuit);
    }

    Ok((config, runtime))
}

async fn run(config: &ReadinessConfig, runtime: Option<String>) -> miette::Result<ExitCode> {
    info!(
        "Checking {} target(s) with {} short-circuit policy",
        config.targets.len(),
        config.short_circuit
    );

    let mut aggregator = Aggregator::new(config, &NetworkProbeFactory)?;
    if let Some(runtime) = runtime {
        aggregator = aggregator.with_presence(Arc::new(CliPresence::new(runtime)));
    }

    let mut reporter = ConsoleReporter::stdout();
    let report = aggregator.run(&mut reporter).await;

    info!(
        "Run finished: {} ready, {} skipped",
        report.results().filter(|r| r.succeeded).count(),
        report.skipped.len()
    );

    Ok(exit_code(report.exit_code()))
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

impl Timing {
    fn policy(&self) -> PollPolicy {
        PollPolicy::from_secs(self.poll_interval, self.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("0"), Ok(0));
        assert_eq!(parse_seconds("300"), Ok(300));
        assert!(parse_seconds("").is_err());
        assert!(parse_seconds("-5").is_err());
        assert!(parse_seconds("+5").is_err());
        assert!(parse_seconds("5s").is_err());
        assert!(parse_seconds("99999999999999999999999").is_err());
    }

    #[test]
    fn test_services_defaults() {
        let cli = Cli::try_parse_from(["waitready", "services"]).unwrap();
        let (config, runtime) = build_config(cli.command).unwrap();
        assert_eq!(config.policy, PollPolicy::from_secs(5, 300));
        assert_eq!(config.targets.len(), 4);
        assert_eq!(config.short_circuit, ShortCircuit::FirstTarget);
        assert!(runtime.is_none());
    }

    #[test]
    fn test_services_positional_periods() {
        let cli = Cli::try_parse_from(["waitready", "services", "1", "3"]).unwrap();
        let (config, _) = build_config(cli.command).unwrap();
        assert_eq!(config.policy.poll_interval, Duration::from_secs(1));
        assert_eq!(config.policy.deadline, Duration::from_secs(3));
    }

    #[test]
    fn test_non_digit_period_is_usage_error() {
        let err = Cli::try_parse_from(["waitready", "services", "abc"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["waitready", "services", "5", "1.5"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["waitready", "services", "5", "300", "7"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_container_requires_name() {
        let err = Cli::try_parse_from(["waitready", "container"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let cli =
            Cli::try_parse_from(["waitready", "container", "koha_docker", "2", "60"]).unwrap();
        let (config, runtime) = build_config(cli.command).unwrap();
        assert_eq!(config.workload.as_deref(), Some("koha_docker"));
        assert_eq!(config.policy, PollPolicy::from_secs(2, 60));
        assert_eq!(config.short_circuit, ShortCircuit::AnyFailure);
        assert_eq!(runtime.as_deref(), Some("docker"));
    }

    #[test]
    fn test_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "targets:\n  - name: API\n    http: http://localhost:9000/health").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from([
            "waitready",
            "services",
            "--targets",
            &path,
            "--short-circuit",
            "never",
        ])
        .unwrap();
        let (config, _) = build_config(cli.command).unwrap();
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].name(), "API");
        assert_eq!(config.short_circuit, ShortCircuit::Never);

        let err =
            Cli::try_parse_from(["waitready", "services", "--short-circuit", "sometimes"])
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_unreadable_target_file_is_config_error() {
        let cli = Cli::try_parse_from([
            "waitready",
            "services",
            "--targets",
            "/nonexistent/targets.yaml",
        ])
        .unwrap();
        assert!(build_config(cli.command).is_err());
    }
}
