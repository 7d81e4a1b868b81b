//! Kubernetes Events emitted on Jenkins objects
//!
//! Phase completions, validation failures and halted seed jobs surface as
//! standard Events (`kubectl describe jenkins <name>`). Publishing is
//! fire-and-forget: a failed Event is logged and never fails a reconcile.

use async_trait::async_trait;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::{Client, Resource};
use tracing::warn;

use crate::crd::Jenkins;

/// Well-known event reason strings (REASON column of `kubectl get events`)
pub mod reasons {
    /// Base configuration (master pod, services, plugins) completed for the first time
    pub const BASE_CONFIGURATION_SUCCESS: &str = "BaseConfigurationSuccess";
    /// User configuration (seed jobs, scripts) completed for the first time
    pub const USER_CONFIGURATION_SUCCESS: &str = "UserConfigurationSuccess";
    /// The Jenkins CR failed validation and needs user correction
    pub const CR_VALIDATION_FAILURE: &str = "CRValidationFailure";
    /// Seed job build failed in a way retries cannot fix
    pub const SEED_JOB_UNRECOVERABLE: &str = "SeedJobUnrecoverable";
}

/// Well-known event action strings (ACTION column of `kubectl get events`)
pub mod actions {
    /// Standard reconciliation loop
    pub const RECONCILE: &str = "Reconcile";
    /// Validating the Jenkins CR
    pub const VALIDATE: &str = "Validate";
    /// Running seed jobs
    pub const SEED: &str = "Seed";
}

/// One Event about a Jenkins object
#[derive(Clone, Debug)]
pub struct Notification {
    /// Normal or Warning
    pub type_: EventType,
    /// One of [`reasons`]
    pub reason: &'static str,
    /// One of [`actions`]
    pub action: &'static str,
    /// Human-readable message
    pub note: String,
}

impl Notification {
    /// A phase completed for the first time
    pub fn phase_completed(reason: &'static str, note: impl Into<String>) -> Self {
        Self {
            type_: EventType::Normal,
            reason,
            action: actions::RECONCILE,
            note: note.into(),
        }
    }

    /// The spec needs user correction before reconciliation can continue
    pub fn validation_failed(note: impl Into<String>) -> Self {
        Self {
            type_: EventType::Warning,
            reason: reasons::CR_VALIDATION_FAILURE,
            action: actions::VALIDATE,
            note: note.into(),
        }
    }

    /// Seed jobs failed unrecoverably and will not be retried for this generation
    pub fn seed_jobs_halted(message: &str) -> Self {
        Self {
            type_: EventType::Warning,
            reason: reasons::SEED_JOB_UNRECOVERABLE,
            action: actions::SEED,
            note: format!("Seed job failed and will not be retried: {message}"),
        }
    }

    /// True for Warning events
    pub fn is_warning(&self) -> bool {
        matches!(self.type_, EventType::Warning)
    }
}

/// Publishes [`Notification`]s on Jenkins objects
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `notification` on `jenkins`; never fails
    async fn publish(&self, jenkins: &Jenkins, notification: Notification);
}

/// Publisher backed by `kube::runtime::events::Recorder`
pub struct KubeEventPublisher {
    recorder: Recorder,
}

impl KubeEventPublisher {
    /// Create a publisher reporting as `controller_name`.
    ///
    /// The reporting instance is taken from `POD_NAME` when set.
    pub fn new(client: Client, controller_name: &str) -> Self {
        let reporter = Reporter {
            controller: controller_name.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventPublisher for KubeEventPublisher {
    async fn publish(&self, jenkins: &Jenkins, notification: Notification) {
        let event = Event {
            type_: notification.type_,
            reason: notification.reason.to_string(),
            note: Some(notification.note),
            action: notification.action.to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&event, &jenkins.object_ref(&())).await {
            warn!(
                cr = %jenkins.identity(),
                reason = notification.reason,
                error = %e,
                "failed to publish Kubernetes event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_completion_is_normal() {
        let n = Notification::phase_completed(
            reasons::BASE_CONFIGURATION_SUCCESS,
            "Base configuration completed",
        );
        assert!(!n.is_warning());
        assert_eq!(n.action, actions::RECONCILE);
        assert_eq!(n.reason, "BaseConfigurationSuccess");
    }

    #[test]
    fn validation_failure_is_a_warning() {
        let n = Notification::validation_failed("Base CR validation failed: image not set");
        assert!(n.is_warning());
        assert_eq!(n.reason, "CRValidationFailure");
        assert_eq!(n.action, actions::VALIDATE);
    }

    #[test]
    fn halted_seed_jobs_carry_the_build_message() {
        let n = Notification::seed_jobs_halted("authentication failed");
        assert!(n.is_warning());
        assert_eq!(n.reason, reasons::SEED_JOB_UNRECOVERABLE);
        assert!(n.note.ends_with("authentication failed"));
    }
}
