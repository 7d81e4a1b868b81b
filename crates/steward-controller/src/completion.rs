//! Phase completion tracking
//!
//! A phase has completed once its timestamp is present in status. The tracker
//! only sets timestamps; the controller persists status and emits the success
//! event when [`mark_once`] reports that it fired. Because the check runs
//! against freshly fetched status on every reconcile, a failed persist is
//! simply retried on the next pass.

use std::fmt;

use chrono::{DateTime, Utc};
use steward_common::crd::JenkinsStatus;
use steward_common::events::reasons;

/// Top-level reconcile stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Provisioning the Jenkins master itself
    Base,
    /// Applying seed jobs and configuration scripts
    User,
}

impl Phase {
    /// Event reason emitted when the phase first completes
    pub fn success_reason(self) -> &'static str {
        match self {
            Phase::Base => reasons::BASE_CONFIGURATION_SUCCESS,
            Phase::User => reasons::USER_CONFIGURATION_SUCCESS,
        }
    }

    /// Event note emitted when the phase first completes
    pub fn success_note(self) -> &'static str {
        match self {
            Phase::Base => "Base configuration completed",
            Phase::User => "User configuration completed",
        }
    }

    fn slot(self, status: &mut JenkinsStatus) -> &mut Option<DateTime<Utc>> {
        match self {
            Phase::Base => &mut status.base_configuration_completed_time,
            Phase::User => &mut status.user_configuration_completed_time,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Base => write!(f, "base"),
            Phase::User => write!(f, "user"),
        }
    }
}

/// When `phase` first completed, if it has
pub fn completed_at(status: &JenkinsStatus, phase: Phase) -> Option<DateTime<Utc>> {
    match phase {
        Phase::Base => status.base_configuration_completed_time,
        Phase::User => status.user_configuration_completed_time,
    }
}

/// Stamp `phase` as completed at `now` unless it already is.
///
/// Returns true only when the timestamp was set by this call.
pub fn mark_once(status: &mut JenkinsStatus, phase: Phase, now: DateTime<Utc>) -> bool {
    let slot = phase.slot(status);
    if slot.is_some() {
        return false;
    }
    *slot = Some(now);
    true
}

/// Stamp the provisioning start time unless already set. Returns true if set.
pub fn mark_provision_started(status: &mut JenkinsStatus, now: DateTime<Utc>) -> bool {
    if status.provision_start_time.is_some() {
        return false;
    }
    status.provision_start_time = Some(now);
    true
}

/// Time from provisioning start to completion of `phase`, when both are known
pub fn phase_duration(status: &JenkinsStatus, phase: Phase) -> Option<chrono::Duration> {
    let started = status.provision_start_time?;
    completed_at(status, phase).map(|done| done - started)
}
