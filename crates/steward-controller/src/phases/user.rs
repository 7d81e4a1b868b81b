//! User configuration phase: seed jobs, then configuration scripts

use std::time::Duration;

use steward_common::crd::Jenkins;
use steward_common::events::Notification;
use steward_common::Error;
use tracing::{debug, warn};

use super::{complete_phase, persist_status, reject, Flow, Outcome};
use crate::completion::Phase;
use crate::controller::Context;
use crate::provisioner::ServerHandle;
use crate::seed_jobs::{self, SeedJobDecision};
use crate::validation::validate_user;

/// Delay before checking configuration scripts (or their ConfigMap) again
pub const SCRIPT_REQUEUE_DELAY: Duration = Duration::from_secs(10);

/// Run the user phase against a master the base phase reported ready
pub async fn run(jenkins: Jenkins, server: ServerHandle, ctx: &Context) -> Result<Outcome, Error> {
    let validation = validate_user(&jenkins, ctx.secrets.as_ref()).await?;
    if !validation.is_valid() {
        warn!(%validation, "validation of user configuration failed, please correct Jenkins CR");
        reject(&jenkins, ctx, format!("User CR validation failed: {validation}")).await;
        return Ok(Outcome::Done);
    }

    if seed_jobs::is_halted(&jenkins) {
        debug!(
            generation = ?jenkins.metadata.generation,
            "seed jobs halted for this generation, waiting for a spec change"
        );
        return Ok(Outcome::Done);
    }

    let status = ctx.seed_jobs.ensure_seed_jobs(&server, &jenkins).await?;
    match seed_jobs::decide(status) {
        SeedJobDecision::Proceed => {}
        SeedJobDecision::Requeue(delay) => return Ok(Outcome::Requeue(delay)),
        SeedJobDecision::Halt { message } => return halt_seed_jobs(jenkins, message, ctx).await,
    }

    ctx.scripts.configure_job(&server).await?;

    let namespace = jenkins.metadata.namespace.clone().unwrap_or_default();
    let config_map = jenkins.user_configuration_config_map_name();
    let Some(scripts) = ctx.kube.get_config_map(&namespace, &config_map).await? else {
        warn!(config_map = %config_map, "user configuration ConfigMap not found yet");
        return Ok(Outcome::Requeue(SCRIPT_REQUEUE_DELAY));
    };

    if !ctx.scripts.ensure_job(&server, &scripts, &jenkins).await? {
        debug!("configuration scripts still running");
        return Ok(Outcome::Requeue(SCRIPT_REQUEUE_DELAY));
    }

    match complete_phase(jenkins, Phase::User, ctx).await? {
        Flow::Continue(_) => Ok(Outcome::Done),
        Flow::Stop(outcome) => Ok(outcome),
    }
}

/// Record the halt against the current generation and tell the user once
async fn halt_seed_jobs(mut jenkins: Jenkins, message: String, ctx: &Context) -> Result<Outcome, Error> {
    warn!(
        %message,
        "seed job failed unrecoverably, retries stop until the spec changes"
    );

    let generation = jenkins.metadata.generation;
    jenkins
        .status
        .get_or_insert_with(Default::default)
        .seed_jobs_halted_generation = generation;

    let Some(stored) = persist_status(&jenkins, ctx).await? else {
        return Ok(Outcome::RequeueNow);
    };

    ctx.events
        .publish(&stored, Notification::seed_jobs_halted(&message))
        .await;

    Ok(Outcome::Done)
}
