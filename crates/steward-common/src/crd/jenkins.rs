//! Jenkins CRD types
//!
//! Defines `Jenkins`, the user-authored desired state of a managed Jenkins
//! instance. The spec may be incomplete when first applied; the controller
//! fills defaults and persists them before any phase runs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// =============================================================================
// Master
// =============================================================================

/// Resource quantity for CPU and memory
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ResourceQuantity {
    /// CPU quantity (e.g., "100m", "1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,

    /// Memory quantity (e.g., "128Mi", "1Gi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

/// Container resource limits and requests
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ResourceRequirements {
    /// Resource requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceQuantity>,

    /// Resource limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceQuantity>,
}

/// Jenkins master pod configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MasterSpec {
    /// Container image reference for the Jenkins master
    #[serde(default)]
    pub image: String,

    /// Plugins managed by the operator: "name:version" -> dependent "name:version"s
    #[serde(default)]
    pub operator_plugins: BTreeMap<String, Vec<String>>,

    /// Plugins requested by the user: "name:version" -> dependent "name:version"s
    #[serde(default)]
    pub plugins: BTreeMap<String, Vec<String>>,

    /// Resource requests and limits for the master container
    #[serde(default)]
    pub resources: ResourceRequirements,
}

// =============================================================================
// Seed jobs
// =============================================================================

/// Reference to a single key inside a Secret in the Jenkins namespace
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct SecretKeySelector {
    /// Secret name
    pub name: String,
    /// Key within the Secret's data
    pub key: String,
}

/// Where the deploy key for a seed job repository comes from
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrivateKeySource {
    /// Secret holding a PEM-encoded PKCS#1 RSA private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<SecretKeySelector>,
}

/// A repository Jenkins clones to bootstrap jobs from
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeedJob {
    /// Unique identifier of the seed job
    #[serde(default)]
    pub id: String,

    /// Job DSL script targets inside the repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<String>,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Branch to check out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_branch: Option<String>,

    /// Repository URL (HTTPS or SSH `git@` form)
    #[serde(default)]
    pub repository_url: String,

    /// Deploy key used for SSH repositories
    #[serde(default)]
    pub private_key: PrivateKeySource,
}

impl SeedJob {
    /// True if the repository URL denotes an SSH remote
    pub fn uses_ssh(&self) -> bool {
        self.repository_url.contains("git@")
    }
}

// =============================================================================
// CRD
// =============================================================================

/// Desired state of a managed Jenkins instance
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "jenkins.io",
    version = "v1alpha1",
    kind = "Jenkins",
    plural = "jenkins",
    shortname = "jk",
    namespaced,
    status = "JenkinsStatus",
    printcolumn = r#"{"name":"Base","type":"date","jsonPath":".status.baseConfigurationCompletedTime"}"#,
    printcolumn = r#"{"name":"User","type":"date","jsonPath":".status.userConfigurationCompletedTime"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsSpec {
    /// Jenkins master configuration
    #[serde(default)]
    pub master: MasterSpec,

    /// Seed jobs applied during the user configuration phase
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed_jobs: Vec<SeedJob>,
}

/// Status of a Jenkins instance.
///
/// Presence of a completion timestamp is the single source of truth for
/// whether a phase has ever completed.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsStatus {
    /// When provisioning of the master first started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provision_start_time: Option<DateTime<Utc>>,

    /// When the base configuration phase first completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_configuration_completed_time: Option<DateTime<Utc>>,

    /// When the user configuration phase first completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_configuration_completed_time: Option<DateTime<Utc>>,

    /// Generation whose seed jobs failed unrecoverably; retries stay off until the spec changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_jobs_halted_generation: Option<i64>,
}

impl Jenkins {
    /// "namespace/name" identity used in logs and error context
    pub fn identity(&self) -> String {
        format!(
            "{}/{}",
            self.namespace().unwrap_or_default(),
            self.name_any()
        )
    }

    /// Name of the ConfigMap holding user configuration scripts
    pub fn user_configuration_config_map_name(&self) -> String {
        format!("{}-user-configuration-{}", crate::OPERATOR_NAME, self.name_any())
    }
}
