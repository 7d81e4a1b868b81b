//! Common types for steward: CRDs, errors, events, plugins and logging

#![deny(missing_docs)]

pub mod config;
pub mod crd;
pub mod error;
pub mod events;
pub mod plugins;
pub mod telemetry;

pub use error::{Error, PersistOutcome};

/// Name of the operator, used as event reporter and resource name prefix
pub const OPERATOR_NAME: &str = "jenkins-operator";

/// Label key placed on Secrets and ConfigMaps that belong to a Jenkins CR.
///
/// The label value is the name of the owning Jenkins object.
pub const JENKINS_CR_LABEL_KEY: &str = "steward.dev/jenkins";
