//! Jenkins plugin declarations and dependency verification
//!
//! Pure functions, no I/O. See [`graph`] for the merge and conflict rules.

pub mod graph;
mod plugin;

use std::collections::BTreeMap;

pub use graph::{
    find_conflicts, verify, InvalidPluginToken, PluginGraph, PluginOrigin, Requirement,
    VersionConflict,
};
pub use plugin::{Plugin, PluginParseError};

/// Plugin the user group is defaulted to when left empty
pub const DEFAULT_USER_PLUGIN: &str = "simple-theme-plugin:0.5.1";

/// Plugins the operator itself needs to configure Jenkins.
///
/// Used as the default for `spec.master.operatorPlugins`.
pub fn base_plugins() -> BTreeMap<String, Vec<String>> {
    let entries: [(&str, &[&str]); 6] = [
        (
            "configuration-as-code:1.4",
            &["configuration-as-code-support:1.4"],
        ),
        (
            "git:3.9.1",
            &[
                "apache-httpcomponents-client-4-api:4.5.5-3.0",
                "credentials:2.1.18",
                "display-url-api:2.3.0",
                "git-client:2.7.3",
                "jsch:0.1.54.2",
                "junit:1.24",
                "mailer:1.22",
                "matrix-project:1.13",
                "scm-api:2.3.0",
                "script-security:1.49",
                "ssh-credentials:1.14",
                "structs:1.17",
                "workflow-api:2.31",
                "workflow-scm-step:2.7",
                "workflow-step-api:2.16",
            ],
        ),
        ("job-dsl:1.70", &["script-security:1.49", "structs:1.17"]),
        (
            "kubernetes:1.13.8",
            &[
                "apache-httpcomponents-client-4-api:4.5.5-3.0",
                "cloudbees-folder:6.7",
                "credentials:2.1.18",
                "durable-task:1.28",
                "jackson2-api:2.9.8",
                "kubernetes-credentials:0.4.0",
                "plain-credentials:1.5",
                "structs:1.17",
                "variant:1.1",
                "workflow-step-api:2.16",
            ],
        ),
        (
            "kubernetes-credentials-provider:0.11",
            &["credentials:2.1.18", "structs:1.17", "variant:1.1"],
        ),
        (
            "workflow-job:2.30",
            &[
                "scm-api:2.3.0",
                "script-security:1.49",
                "structs:1.17",
                "workflow-api:2.31",
                "workflow-step-api:2.16",
                "workflow-support:3.0",
            ],
        ),
    ];

    entries
        .iter()
        .map(|(root, deps)| {
            (
                root.to_string(),
                deps.iter().map(|d| d.to_string()).collect(),
            )
        })
        .collect()
}

/// Default for `spec.master.plugins`
pub fn default_user_plugins() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(DEFAULT_USER_PLUGIN.to_string(), Vec::new())])
}
