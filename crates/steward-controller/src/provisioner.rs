//! Collaborators the controller delegates to
//!
//! Provisioning the Jenkins master (pods, services, config maps), talking to
//! its HTTP API, and running scripts on it are implemented outside this
//! crate. The controller only depends on the contracts below.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use steward_common::crd::Jenkins;
use steward_common::Error;

/// Connection details for a running Jenkins master.
///
/// Produced by the base provisioner once the master is reachable and handed
/// to every user-phase collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerHandle {
    /// Base URL of the Jenkins HTTP API
    pub url: String,
    /// Secret (in the Jenkins namespace) holding API credentials
    pub credentials_secret: String,
}

/// Result of one base provisioning pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BaseOutcome {
    /// The master is not ready yet; check again after the delay
    InProgress {
        /// How long to wait before the next pass
        requeue_after: Duration,
    },
    /// The master is running and reachable
    Ready(ServerHandle),
}

/// Result of one "ensure seed jobs" pass.
///
/// Infrastructure failures are returned as `Err` instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedJobStatus {
    /// All seed jobs are configured and their builds succeeded
    Done,
    /// A seed build is queued or running
    Pending,
    /// A seed build failed but may succeed if retried
    BuildFailed {
        /// Description from the build
        message: String,
    },
    /// A seed build failed in a way retries cannot fix (e.g. bad credentials)
    Unrecoverable {
        /// Description from the build
        message: String,
    },
}

/// Provisions the Jenkins master itself
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BaseProvisioner: Send + Sync {
    /// Provisioner-specific checks on the spec; `Ok(false)` means invalid
    async fn validate(&self, jenkins: &Jenkins) -> Result<bool, Error>;

    /// Drive the master toward the spec
    async fn reconcile(&self, jenkins: &Jenkins) -> Result<BaseOutcome, Error>;
}

/// Configures and builds seed jobs on the running master
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SeedJobRunner: Send + Sync {
    /// Ensure every declared seed job exists and its build succeeded
    async fn ensure_seed_jobs(
        &self,
        server: &ServerHandle,
        jenkins: &Jenkins,
    ) -> Result<SeedJobStatus, Error>;
}

/// Applies user configuration scripts on the running master
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Make sure the job that runs configuration scripts exists
    async fn configure_job(&self, server: &ServerHandle) -> Result<(), Error>;

    /// Run the scripts in `scripts` until all have been applied; `Ok(false)` while still running
    async fn ensure_job(
        &self,
        server: &ServerHandle,
        scripts: &BTreeMap<String, String>,
        jenkins: &Jenkins,
    ) -> Result<bool, Error>;
}
