//! Spec defaulting
//!
//! Fills unset fields of a freshly applied Jenkins spec. The controller
//! persists the result before any phase runs, so validation and provisioning
//! always see a fully defaulted spec.

use steward_common::crd::{JenkinsSpec, ResourceQuantity};
use steward_common::plugins::{base_plugins, default_user_plugins};
use tracing::debug;

/// Image used when `spec.master.image` is empty
pub const DEFAULT_IMAGE: &str = "jenkins/jenkins:lts";

/// Default CPU request for the master container
pub const DEFAULT_REQUEST_CPU: &str = "1";
/// Default memory request for the master container
pub const DEFAULT_REQUEST_MEMORY: &str = "500Mi";
/// Default CPU limit for the master container
pub const DEFAULT_LIMIT_CPU: &str = "1500m";
/// Default memory limit for the master container
pub const DEFAULT_LIMIT_MEMORY: &str = "3Gi";

/// Fill unset fields in place. Returns true if anything changed.
pub fn apply_defaults(spec: &mut JenkinsSpec) -> bool {
    let master = &mut spec.master;
    let mut changed = false;

    if master.image.is_empty() {
        debug!(image = DEFAULT_IMAGE, "defaulting master image");
        master.image = DEFAULT_IMAGE.to_string();
        changed = true;
    }

    if master.operator_plugins.is_empty() {
        debug!("defaulting operator plugins");
        master.operator_plugins = base_plugins();
        changed = true;
    }

    if master.plugins.is_empty() {
        debug!("defaulting user plugins");
        master.plugins = default_user_plugins();
        changed = true;
    }

    let requests = master.resources.requests.get_or_insert_with(Default::default);
    changed |= fill_quantity(requests, DEFAULT_REQUEST_CPU, DEFAULT_REQUEST_MEMORY);

    let limits = master.resources.limits.get_or_insert_with(Default::default);
    changed |= fill_quantity(limits, DEFAULT_LIMIT_CPU, DEFAULT_LIMIT_MEMORY);

    changed
}

fn fill_quantity(quantity: &mut ResourceQuantity, cpu: &str, memory: &str) -> bool {
    let mut changed = false;
    if quantity.cpu.as_deref().map_or(true, str::is_empty) {
        quantity.cpu = Some(cpu.to_string());
        changed = true;
    }
    if quantity.memory.as_deref().map_or(true, str::is_empty) {
        quantity.memory = Some(memory.to_string());
        changed = true;
    }
    changed
}
