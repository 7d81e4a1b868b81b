//! Custom Resource Definitions for steward

mod jenkins;

pub use jenkins::{
    Jenkins, JenkinsStatus, JenkinsSpec, MasterSpec, PrivateKeySource, ResourceQuantity,
    ResourceRequirements, SecretKeySelector, SeedJob,
};
