use crate::error::Result;
use crate::presence::WorkloadPresence;
use crate::probes::{Probe, ProbeFactory};
use crate::report::Reporter;
use crate::retrier::wait_until_ready;
use std::sync::Arc;
use tracing::{info, warn};
use waitready_core::{ReadinessConfig, ReportEntry, RunReport};

/// Checks every configured target in order and produces the run verdict
///
/// Probes are built when the aggregator is constructed, so a target that
/// cannot be probed surfaces as an error before anything is sent. Once
/// built, [`Aggregator::run`] cannot fail: every failure ends up as an
/// entry in the [`RunReport`].
pub struct Aggregator<'c> {
    config: &'c ReadinessConfig,
    probes: Vec<Box<dyn Probe>>,
    presence: Option<Arc<dyn WorkloadPresence>>,
}

impl<'c> Aggregator<'c> {
    pub fn new(config: &'c ReadinessConfig, factory: &dyn ProbeFactory) -> Result<Self> {
        let probes = config
            .targets
            .iter()
            .map(|target| factory.build(target, &target.effective_policy(&config.policy)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            probes,
            presence: None,
        })
    }

    /// Gate the run on `config.workload` being reported present
    pub fn with_presence(mut self, presence: Arc<dyn WorkloadPresence>) -> Self {
        self.presence = Some(presence);
        self
    }

    pub async fn run(&self, reporter: &mut dyn Reporter) -> RunReport<'c> {
        let config = self.config;
        reporter.configuration(config);

        if let (Some(workload), Some(presence)) = (&config.workload, &self.presence) {
            let present = presence.is_present(workload).await;
            reporter.workload_checked(workload, present);
            if !present {
                warn!("Workload '{}' is not running, skipping all targets", workload);
                return RunReport::workload_absent(workload.clone(), config.targets.iter().collect());
            }
        }

        let mut report = RunReport::default();

        for (index, (target, probe)) in config.targets.iter().zip(&self.probes).enumerate() {
            let policy = target.effective_policy(&config.policy);
            let result = wait_until_ready(target, probe.as_ref(), &policy, reporter).await;
            reporter.target_finished(&result);

            let failed = !result.succeeded;
            report.entries.push(ReportEntry::Target(result));

            if failed && config.short_circuit.stops_after(index) {
                report.skipped.extend(&config.targets[index + 1..]);
                if !report.skipped.is_empty() {
                    info!(
                        "{} failed, skipping {} remaining target(s) ({} policy)",
                        target.name(),
                        report.skipped.len(),
                        config.short_circuit
                    );
                }
                break;
            }
        }

        report
    }
}
