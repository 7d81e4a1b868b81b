//! Controller runner - wires the Jenkins reconciler into `kube::runtime`
//!
//! Besides Jenkins objects themselves, the controller reacts to Pods it owns
//! and to Secrets/ConfigMaps labelled with the owning Jenkins name (deploy
//! keys, configuration scripts).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Client, Resource};
use tracing::info;

use steward_common::config::{ControllerArgs, RunnerConfig};
use steward_common::crd::Jenkins;
use steward_common::telemetry::{init_logging, TelemetryError};
use steward_common::JENKINS_CR_LABEL_KEY;

use crate::controller::{error_policy, reconcile, Collaborators, Context};

fn api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    K::DynamicType: Default,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

/// Jenkins object a labelled Secret or ConfigMap belongs to
fn owning_jenkins(meta: &ObjectMeta) -> Option<ObjectRef<Jenkins>> {
    let name = meta.labels.as_ref()?.get(JENKINS_CR_LABEL_KEY)?;
    let namespace = meta.namespace.as_deref()?;
    Some(ObjectRef::new(name).within(namespace))
}

/// Build the Jenkins controller future
pub fn build_controller(
    client: Client,
    collaborators: Collaborators,
    config: &RunnerConfig,
) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    let ctx = Arc::new(
        Context::builder(client.clone(), collaborators)
            .error_requeue(config.error_requeue)
            .build(),
    );
    let namespace = config.watch_namespace.as_deref();
    let watcher = WatcherConfig::default().timeout(config.watch_timeout_secs);
    let labelled = watcher.clone().labels(JENKINS_CR_LABEL_KEY);

    match namespace {
        Some(ns) => info!(namespace = %ns, "- Jenkins controller"),
        None => info!("- Jenkins controller (all namespaces)"),
    }

    Box::pin(
        Controller::new(api::<Jenkins>(&client, namespace), watcher.clone())
            .owns(api::<Pod>(&client, namespace), watcher)
            .watches(
                api::<Secret>(&client, namespace),
                labelled.clone(),
                |secret| owning_jenkins(&secret.metadata),
            )
            .watches(
                api::<ConfigMap>(&client, namespace),
                labelled,
                |config_map| owning_jenkins(&config_map.metadata),
            )
            .shutdown_on_signal()
            .run(reconcile, error_policy, ctx)
            .for_each(log_reconcile_result("Jenkins")),
    )
}

/// Install logging from `args`, then run the Jenkins controller until a
/// shutdown signal arrives
pub async fn run(
    client: Client,
    collaborators: Collaborators,
    args: &ControllerArgs,
) -> Result<(), TelemetryError> {
    init_logging(&args.log_config())?;
    build_controller(client, collaborators, &args.runner_config()).await;
    info!("Jenkins controller stopped");
    Ok(())
}

fn log_reconcile_result<T: std::fmt::Debug, E: std::fmt::Debug>(
    controller_name: &'static str,
) -> impl Fn(Result<T, E>) -> std::future::Ready<()> {
    move |result| {
        match result {
            Ok(action) => tracing::debug!(?action, "{} reconciliation completed", controller_name),
            Err(e) => tracing::warn!(error = ?e, "{} reconciliation error", controller_name),
        }
        std::future::ready(())
    }
}
