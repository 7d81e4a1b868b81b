//! Reconcile phases
//!
//! Each phase either hands the (possibly re-persisted) Jenkins object on to
//! the next phase or stops the pass with an [`Outcome`].

pub mod base;
pub mod user;

use std::time::Duration;

use chrono::Utc;
use kube::runtime::controller::Action;
use steward_common::crd::Jenkins;
use steward_common::events::Notification;
use steward_common::{Error, PersistOutcome};
use tracing::{debug, info};

use crate::completion::{self, Phase};
use crate::controller::Context;

/// Terminal decision of one reconcile pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing left to do until the object or its dependents change
    Done,
    /// Re-run after the delay
    Requeue(Duration),
    /// Re-run immediately against freshly fetched state (write conflict)
    RequeueNow,
}

impl Outcome {
    /// Convert into the action handed back to the kube runtime
    pub fn into_action(self) -> Action {
        match self {
            Outcome::Done => Action::await_change(),
            Outcome::Requeue(delay) => Action::requeue(delay),
            Outcome::RequeueNow => Action::requeue(Duration::ZERO),
        }
    }
}

/// Continue with a value, or stop the pass
#[derive(Debug)]
pub enum Flow<T> {
    /// Proceed to the next step
    Continue(T),
    /// End the pass with this outcome
    Stop(Outcome),
}

/// Persist status. `None` means the write lost an optimistic-concurrency race.
pub(crate) async fn persist_status(jenkins: &Jenkins, ctx: &Context) -> Result<Option<Jenkins>, Error> {
    match ctx.kube.update_jenkins_status(jenkins).await? {
        PersistOutcome::Updated(stored) => Ok(Some(*stored)),
        PersistOutcome::Conflict => {
            debug!("status write conflicted, requeueing");
            Ok(None)
        }
    }
}

/// Stamp `phase` as completed, persist, then emit the success event.
///
/// The event is only published after the write lands, so a lost write leaves
/// the phase unstamped and the next pass fires it again.
pub(crate) async fn complete_phase(
    mut jenkins: Jenkins,
    phase: Phase,
    ctx: &Context,
) -> Result<Flow<Jenkins>, Error> {
    let status = jenkins.status.get_or_insert_with(Default::default);
    if !completion::mark_once(status, phase, Utc::now()) {
        return Ok(Flow::Continue(jenkins));
    }

    let Some(stored) = persist_status(&jenkins, ctx).await? else {
        return Ok(Flow::Stop(Outcome::RequeueNow));
    };

    let took = stored
        .status
        .as_ref()
        .and_then(|s| completion::phase_duration(s, phase))
        .map(|d| d.to_string());
    info!(%phase, took = took.as_deref().unwrap_or("unknown"), "configuration phase is complete");

    ctx.events
        .publish(
            &stored,
            Notification::phase_completed(phase.success_reason(), phase.success_note()),
        )
        .await;

    Ok(Flow::Continue(stored))
}

/// Publish a warning that the spec needs user correction
pub(crate) async fn reject(jenkins: &Jenkins, ctx: &Context, note: String) {
    ctx.events
        .publish(jenkins, Notification::validation_failed(note))
        .await;
}
