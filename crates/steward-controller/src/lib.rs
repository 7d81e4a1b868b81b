//! Reconciliation controller for Jenkins instances
//!
//! Drives a `Jenkins` object toward its declared state in two phases:
//! base configuration (the master itself) and user configuration (seed jobs
//! and configuration scripts). Provisioning, the Jenkins HTTP client and
//! script execution are injected through the traits in [`provisioner`].

#![deny(missing_docs)]

pub mod client;
pub mod completion;
pub mod controller;
pub mod defaults;
pub mod image;
pub mod phases;
pub mod provisioner;
pub mod runner;
pub mod seed_jobs;
pub mod validation;

pub use controller::{error_policy, reconcile, reconcile_jenkins, Collaborators, Context};
pub use phases::Outcome;
pub use provisioner::{
    BaseOutcome, BaseProvisioner, ScriptRunner, SeedJobRunner, SeedJobStatus, ServerHandle,
};
