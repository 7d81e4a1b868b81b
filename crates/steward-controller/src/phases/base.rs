//! Base configuration phase: validate the master spec and provision it

use chrono::Utc;
use steward_common::crd::Jenkins;
use steward_common::Error;
use tracing::{debug, warn};

use super::{complete_phase, persist_status, reject, Flow, Outcome};
use crate::completion::{self, Phase};
use crate::controller::Context;
use crate::provisioner::{BaseOutcome, ServerHandle};
use crate::validation::validate_base;

/// Run the base phase, yielding the object and a handle to the running master
pub async fn run(
    mut jenkins: Jenkins,
    ctx: &Context,
) -> Result<Flow<(Jenkins, ServerHandle)>, Error> {
    let validation = validate_base(&jenkins, ctx.base.as_ref()).await?;
    if !validation.is_valid() {
        warn!(%validation, "validation of base configuration failed, please correct Jenkins CR");
        reject(&jenkins, ctx, format!("Base CR validation failed: {validation}")).await;
        return Ok(Flow::Stop(Outcome::Done));
    }

    let status = jenkins.status.get_or_insert_with(Default::default);
    if completion::mark_provision_started(status, Utc::now()) {
        match persist_status(&jenkins, ctx).await? {
            Some(stored) => jenkins = stored,
            None => return Ok(Flow::Stop(Outcome::RequeueNow)),
        }
    }

    let server = match ctx.base.reconcile(&jenkins).await? {
        BaseOutcome::InProgress { requeue_after } => {
            debug!(?requeue_after, "base configuration in progress");
            return Ok(Flow::Stop(Outcome::Requeue(requeue_after)));
        }
        BaseOutcome::Ready(server) => server,
    };

    match complete_phase(jenkins, Phase::Base, ctx).await? {
        Flow::Continue(jenkins) => Ok(Flow::Continue((jenkins, server))),
        Flow::Stop(outcome) => Ok(Flow::Stop(outcome)),
    }
}
