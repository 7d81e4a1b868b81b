//! Kubernetes access for the Jenkins controller
//!
//! Everything the controller reads or writes on the API server goes through
//! [`KubeClient`] and [`SecretStore`], so reconciliation can be exercised
//! against mocks. Writes use the object's resource version for optimistic
//! concurrency and report conflicts as [`PersistOutcome::Conflict`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::{Client, ResourceExt};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use steward_common::crd::Jenkins;
use steward_common::{Error, PersistOutcome};

/// Trait abstracting Kubernetes client operations for Jenkins objects
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KubeClient: Send + Sync {
    /// Fetch a Jenkins object, `None` if it no longer exists
    async fn get_jenkins(&self, namespace: &str, name: &str) -> Result<Option<Jenkins>, Error>;

    /// Replace the Jenkins object (spec and metadata) using its resource version
    async fn update_jenkins(&self, jenkins: &Jenkins) -> Result<PersistOutcome, Error>;

    /// Write the Jenkins status subresource, guarded by its resource version
    async fn update_jenkins_status(&self, jenkins: &Jenkins) -> Result<PersistOutcome, Error>;

    /// Fetch a ConfigMap's data, `None` if the ConfigMap does not exist
    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>, Error>;
}

/// Read access to Secrets, injected into the spec validator
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a Secret's decoded data, `None` if the Secret does not exist
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>, Error>;
}

/// Real Kubernetes client implementation
pub struct KubeClientImpl {
    client: Client,
}

impl KubeClientImpl {
    /// Create a new KubeClientImpl wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn jenkins_api(&self, jenkins: &Jenkins) -> Result<Api<Jenkins>, Error> {
        let namespace = jenkins.namespace().ok_or_else(|| {
            Error::internal_with_context("kube-client", "Jenkins object has no namespace")
        })?;
        Ok(Api::namespaced(self.client.clone(), &namespace))
    }
}

#[async_trait]
impl KubeClient for KubeClientImpl {
    async fn get_jenkins(&self, namespace: &str, name: &str) -> Result<Option<Jenkins>, Error> {
        let api: Api<Jenkins> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name)
            .await
            .map_err(|e| Error::kube(format!("get jenkins {namespace}/{name}"), e))
    }

    async fn update_jenkins(&self, jenkins: &Jenkins) -> Result<PersistOutcome, Error> {
        let api = self.jenkins_api(jenkins)?;
        let name = jenkins.name_any();
        let result = api.replace(&name, &PostParams::default(), jenkins).await;
        PersistOutcome::from_write(format!("update jenkins {}", jenkins.identity()), result)
    }

    async fn update_jenkins_status(&self, jenkins: &Jenkins) -> Result<PersistOutcome, Error> {
        let api = self.jenkins_api(jenkins)?;
        let name = jenkins.name_any();
        let status = serde_json::to_value(&jenkins.status)
            .map_err(|e| Error::serialization_for_kind("Jenkins", e.to_string()))?;
        // Carrying the resource version makes the API server reject stale writes with 409
        let patch = serde_json::json!({
            "metadata": { "resourceVersion": jenkins.resource_version() },
            "status": status,
        });
        let result = api
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await;
        PersistOutcome::from_write(
            format!("update jenkins status {}", jenkins.identity()),
            result,
        )
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>, Error> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let config_map = api
            .get_opt(name)
            .await
            .map_err(|e| Error::kube(format!("get configmap {namespace}/{name}"), e))?;
        Ok(config_map.map(|cm| cm.data.unwrap_or_default()))
    }
}

/// Secret store backed by the Kubernetes API
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    /// Create a new store wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>, Error> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api
            .get_opt(name)
            .await
            .map_err(|e| Error::kube(format!("get secret {namespace}/{name}"), e))?;

        let Some(secret) = secret else {
            debug!(namespace, secret = name, "secret not found");
            return Ok(None);
        };

        Ok(Some(secret_data(secret)))
    }
}

/// Merge `data` and `stringData` into raw bytes, `data` winning on collision
fn secret_data(secret: Secret) -> BTreeMap<String, Vec<u8>> {
    let mut merged: BTreeMap<String, Vec<u8>> = secret
        .string_data
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.into_bytes()))
        .collect();
    for (k, v) in secret.data.unwrap_or_default() {
        merged.insert(k, v.0);
    }
    merged
}
