//! Seed job retry policy
//!
//! Maps the outcome of an "ensure seed jobs" pass to a control decision.
//! Infrastructure errors never reach this module: they are propagated by the
//! caller before classification.

use std::time::Duration;

use steward_common::crd::Jenkins;
use tracing::{debug, warn};

use crate::provisioner::SeedJobStatus;

/// Delay before checking a pending or failed seed build again
pub const SEED_JOB_REQUEUE_DELAY: Duration = Duration::from_secs(10);

/// What the controller does after an "ensure seed jobs" pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedJobDecision {
    /// Seed jobs are in place; continue with scripted configuration
    Proceed,
    /// Check again after the delay
    Requeue(Duration),
    /// Stop retrying until the spec changes
    Halt {
        /// Failure reported by the seed build
        message: String,
    },
}

/// Classify a seed job status into a control decision
pub fn decide(status: SeedJobStatus) -> SeedJobDecision {
    match status {
        SeedJobStatus::Done => SeedJobDecision::Proceed,
        SeedJobStatus::Pending => {
            debug!("seed jobs not ready yet");
            SeedJobDecision::Requeue(SEED_JOB_REQUEUE_DELAY)
        }
        SeedJobStatus::BuildFailed { message } => {
            warn!(%message, "seed job build failed, retrying");
            SeedJobDecision::Requeue(SEED_JOB_REQUEUE_DELAY)
        }
        SeedJobStatus::Unrecoverable { message } => SeedJobDecision::Halt { message },
    }
}

/// True if seed jobs were halted for the object's current generation.
///
/// A spec edit bumps `metadata.generation`, which re-enables retries.
pub fn is_halted(jenkins: &Jenkins) -> bool {
    let halted = jenkins
        .status
        .as_ref()
        .and_then(|s| s.seed_jobs_halted_generation);
    halted.is_some() && halted == jenkins.metadata.generation
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use steward_common::crd::{JenkinsSpec, JenkinsStatus};

    #[rstest]
    #[case(SeedJobStatus::Done, SeedJobDecision::Proceed)]
    #[case(SeedJobStatus::Pending, SeedJobDecision::Requeue(SEED_JOB_REQUEUE_DELAY))]
    #[case(
        SeedJobStatus::BuildFailed { message: "flaky agent".to_string() },
        SeedJobDecision::Requeue(SEED_JOB_REQUEUE_DELAY)
    )]
    #[case(
        SeedJobStatus::Unrecoverable { message: "bad credentials".to_string() },
        SeedJobDecision::Halt { message: "bad credentials".to_string() }
    )]
    fn maps_status_to_decision(#[case] status: SeedJobStatus, #[case] expected: SeedJobDecision) {
        assert_eq!(decide(status), expected);
    }

    #[test]
    fn requeue_delay_is_ten_seconds() {
        assert_eq!(SEED_JOB_REQUEUE_DELAY, Duration::from_secs(10));
    }

    fn jenkins(generation: Option<i64>, halted: Option<i64>) -> Jenkins {
        let mut jenkins = Jenkins::new("ci", JenkinsSpec::default());
        jenkins.metadata.generation = generation;
        jenkins.status = Some(JenkinsStatus {
            seed_jobs_halted_generation: halted,
            ..Default::default()
        });
        jenkins
    }

    #[rstest]
    #[case(Some(3), Some(3), true)]
    #[case(Some(4), Some(3), false)]
    #[case(Some(3), None, false)]
    #[case(None, None, false)]
    fn halt_is_scoped_to_generation(
        #[case] generation: Option<i64>,
        #[case] halted: Option<i64>,
        #[case] expected: bool,
    ) {
        assert_eq!(is_halted(&jenkins(generation, halted)), expected);
    }

    #[test]
    fn missing_status_is_not_halted() {
        assert!(!is_halted(&Jenkins::new("ci", JenkinsSpec::default())));
    }
}
