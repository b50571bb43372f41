use crate::probes::Probe;
use crate::report::Reporter;
use tokio::time::{sleep, Instant};
use tracing::debug;
use waitready_core::{PollPolicy, RetryResult, Target};

/// Probe `target` until it succeeds or `policy.deadline` has elapsed
///
/// The first attempt happens immediately. The deadline is only checked
/// between attempts, and the sleep before an attempt is always taken, so a
/// failing target returns after up to `deadline + poll_interval` plus the
/// latency of the last probe. There is no attempt limit and no backoff.
pub async fn wait_until_ready<'a>(
    target: &'a Target,
    probe: &dyn Probe,
    policy: &PollPolicy,
    reporter: &mut dyn Reporter,
) -> RetryResult<'a> {
    let start = Instant::now();

    let mut outcome = probe.check().await;
    let mut attempts = 1;
    if !outcome.succeeded {
        reporter.attempt_failed(target, &outcome);
    }
    let mut elapsed = start.elapsed();

    while !outcome.succeeded && elapsed < policy.deadline {
        sleep(policy.poll_interval).await;

        outcome = probe.check().await;
        attempts += 1;
        if !outcome.succeeded {
            reporter.attempt_failed(target, &outcome);
        }
        elapsed = start.elapsed();
    }

    reporter.wait_finished(target);

    debug!(
        "{} {} after {} attempt(s) in {:?} (last status {})",
        target.name(),
        if outcome.succeeded { "ready" } else { "not ready" },
        attempts,
        elapsed,
        outcome.raw_status
    );

    RetryResult {
        target,
        succeeded: outcome.succeeded,
        elapsed,
        attempts,
        last_status: outcome.raw_status,
    }
}
