//! Jenkins controller implementation
//!
//! One reconcile pass runs fetch → default → validate(base) → provision(base)
//! → validate(user) → provision(user), short-circuiting at the first step
//! that is not ready. Nothing is cached between passes: every invocation
//! re-fetches the object and re-derives its decisions from what is stored.

use std::sync::Arc;
use std::time::Duration;

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};
use tracing::{debug, info, instrument, warn};

use steward_common::config::DEFAULT_ERROR_REQUEUE_SECS;
use steward_common::crd::Jenkins;
use steward_common::events::{EventPublisher, KubeEventPublisher};
use steward_common::{Error, PersistOutcome, OPERATOR_NAME};

use crate::client::{KubeClient, KubeClientImpl, KubeSecretStore, SecretStore};
use crate::defaults::apply_defaults;
use crate::phases::{self, Flow, Outcome};
use crate::provisioner::{BaseProvisioner, ScriptRunner, SeedJobRunner};

/// Externally implemented collaborators the controller delegates to
#[derive(Clone)]
pub struct Collaborators {
    /// Provisions the Jenkins master
    pub base: Arc<dyn BaseProvisioner>,
    /// Ensures seed jobs on the running master
    pub seed_jobs: Arc<dyn SeedJobRunner>,
    /// Applies configuration scripts on the running master
    pub scripts: Arc<dyn ScriptRunner>,
}

/// Shared context for the Jenkins controller
///
/// Use [`ContextBuilder`] to construct instances:
///
/// ```text
/// let ctx = Context::builder(client, collaborators)
///     .error_requeue(Duration::from_secs(10))
///     .build();
/// ```
pub struct Context {
    /// Kubernetes client for Jenkins objects and ConfigMaps (trait object for testability)
    pub kube: Arc<dyn KubeClient>,
    /// Secret reads for seed job validation
    pub secrets: Arc<dyn SecretStore>,
    /// Base provisioner
    pub base: Arc<dyn BaseProvisioner>,
    /// Seed job runner
    pub seed_jobs: Arc<dyn SeedJobRunner>,
    /// Configuration script runner
    pub scripts: Arc<dyn ScriptRunner>,
    /// Kubernetes Event publisher
    pub events: Arc<dyn EventPublisher>,
    /// Backoff applied to unclassified reconcile errors
    pub error_requeue: Duration,
}

impl Context {
    /// Create a builder for constructing a Context
    pub fn builder(client: Client, collaborators: Collaborators) -> ContextBuilder {
        ContextBuilder::new(client, collaborators)
    }

    /// Create a context for testing with mock clients
    #[cfg(test)]
    pub fn for_testing(
        kube: Arc<dyn KubeClient>,
        secrets: Arc<dyn SecretStore>,
        collaborators: Collaborators,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            kube,
            secrets,
            base: collaborators.base,
            seed_jobs: collaborators.seed_jobs,
            scripts: collaborators.scripts,
            events,
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
        }
    }
}

/// Builder for constructing [`Context`] instances
pub struct ContextBuilder {
    client: Client,
    collaborators: Collaborators,
    kube: Option<Arc<dyn KubeClient>>,
    secrets: Option<Arc<dyn SecretStore>>,
    events: Option<Arc<dyn EventPublisher>>,
    error_requeue: Duration,
}

impl ContextBuilder {
    fn new(client: Client, collaborators: Collaborators) -> Self {
        Self {
            client,
            collaborators,
            kube: None,
            secrets: None,
            events: None,
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
        }
    }

    /// Override the Kubernetes client
    pub fn kube_client(mut self, kube: Arc<dyn KubeClient>) -> Self {
        self.kube = Some(kube);
        self
    }

    /// Override the secret store
    pub fn secret_store(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Override the event publisher
    pub fn event_publisher(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    /// Set the backoff for unclassified reconcile errors
    pub fn error_requeue(mut self, delay: Duration) -> Self {
        self.error_requeue = delay;
        self
    }

    /// Build the Context
    pub fn build(self) -> Context {
        Context {
            kube: self
                .kube
                .unwrap_or_else(|| Arc::new(KubeClientImpl::new(self.client.clone()))),
            secrets: self
                .secrets
                .unwrap_or_else(|| Arc::new(KubeSecretStore::new(self.client.clone()))),
            base: self.collaborators.base,
            seed_jobs: self.collaborators.seed_jobs,
            scripts: self.collaborators.scripts,
            events: self.events.unwrap_or_else(|| {
                Arc::new(KubeEventPublisher::new(self.client.clone(), OPERATOR_NAME))
            }),
            error_requeue: self.error_requeue,
        }
    }
}

/// Reconcile a Jenkins resource
///
/// The object handed in by the runtime only supplies the identity; the pass
/// itself works on a freshly fetched copy.
#[instrument(skip(jenkins, ctx), fields(cr = %jenkins.identity()))]
pub async fn reconcile(jenkins: Arc<Jenkins>, ctx: Arc<Context>) -> Result<Action, Error> {
    let namespace = jenkins.namespace().ok_or_else(|| {
        Error::internal_with_context("reconciler", "Jenkins object has no namespace")
    })?;
    let name = jenkins.name_any();
    debug!("reconciling jenkins");

    let outcome = reconcile_jenkins(&namespace, &name, &ctx).await?;
    debug!(?outcome, "reconcile pass finished");
    Ok(outcome.into_action())
}

/// Run one reconcile pass for the Jenkins object `namespace/name`
pub async fn reconcile_jenkins(
    namespace: &str,
    name: &str,
    ctx: &Context,
) -> Result<Outcome, Error> {
    let Some(mut jenkins) = ctx.kube.get_jenkins(namespace, name).await? else {
        info!("jenkins not found, assuming it was deleted");
        return Ok(Outcome::Done);
    };

    if apply_defaults(&mut jenkins.spec) {
        info!("persisting defaulted spec");
        match ctx.kube.update_jenkins(&jenkins).await? {
            PersistOutcome::Updated(stored) => jenkins = *stored,
            PersistOutcome::Conflict => {
                debug!("spec write conflicted, requeueing");
                return Ok(Outcome::RequeueNow);
            }
        }
    }

    let (jenkins, server) = match phases::base::run(jenkins, ctx).await? {
        Flow::Continue(ready) => ready,
        Flow::Stop(outcome) => return Ok(outcome),
    };

    phases::user::run(jenkins, server, ctx).await
}

/// Error policy for the controller
///
/// Resource version conflicts are expected under concurrent writers and are
/// retried immediately without being surfaced. Everything else is logged and
/// retried after the configured backoff.
pub fn error_policy(jenkins: Arc<Jenkins>, error: &Error, ctx: Arc<Context>) -> Action {
    if error.is_conflict() {
        debug!(cr = %jenkins.identity(), %error, "conflict, requeueing");
        return Action::requeue(Duration::ZERO);
    }

    warn!(
        ?error,
        cr = %jenkins.identity(),
        context = error.context().unwrap_or_default(),
        retryable = error.is_retryable(),
        "reconciliation failed"
    );
    Action::requeue(ctx.error_requeue)
}
