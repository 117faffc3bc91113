//! # Cluster Store
//!
//! The only way the reconciler reads or writes cluster state.
//! [`KubeStore`] talks to the API server; tests substitute an in-memory store.

use crate::constants::CONTROLLER_NAME;
use crate::crd::{SealedAge, SealedAgeStatus};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ListParams, Patch, PatchParams, PostParams};
use kube::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,
    #[error("API error {code} ({reason}): {message}")]
    Api {
        code: u16,
        reason: String,
        message: String,
    },
    #[error("transport error: {0}")]
    Transport(#[source] kube::Error),
}

impl StoreError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<kube::Error> for StoreError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(api_err) if api_err.code == 404 => StoreError::NotFound,
            kube::Error::Api(api_err) => StoreError::Api {
                code: api_err.code,
                reason: api_err.reason.clone(),
                message: api_err.message.clone(),
            },
            other => StoreError::Transport(other),
        }
    }
}

/// Reads and writes the reconciler needs.
///
/// A missing object on `get_*` is `Ok(None)`, not an error.
#[async_trait]
pub trait ClusterStore: Send + Sync {
    async fn get_sealed_age(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<SealedAge>, StoreError>;

    async fn list_secrets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Secret>, StoreError>;

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError>;

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, StoreError>;

    async fn replace_secret(
        &self,
        namespace: &str,
        name: &str,
        secret: &Secret,
    ) -> Result<Secret, StoreError>;

    /// Write the status subresource of a SealedAge
    async fn patch_sealed_age_status(
        &self,
        namespace: &str,
        name: &str,
        status: &SealedAgeStatus,
    ) -> Result<(), StoreError>;
}

/// [`ClusterStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn sealed_ages(&self, namespace: &str) -> Api<SealedAge> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    async fn get_sealed_age(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<SealedAge>, StoreError> {
        Ok(self.sealed_ages(namespace).get_opt(name).await?)
    }

    async fn list_secrets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Secret>, StoreError> {
        let params = ListParams::default().labels(label_selector);
        Ok(self.secrets(namespace).list(&params).await?.items)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError> {
        Ok(self.secrets(namespace).get_opt(name).await?)
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, StoreError> {
        Ok(self
            .secrets(namespace)
            .create(&PostParams::default(), secret)
            .await?)
    }

    async fn replace_secret(
        &self,
        namespace: &str,
        name: &str,
        secret: &Secret,
    ) -> Result<Secret, StoreError> {
        Ok(self
            .secrets(namespace)
            .replace(name, &PostParams::default(), secret)
            .await?)
    }

    async fn patch_sealed_age_status(
        &self,
        namespace: &str,
        name: &str,
        status: &SealedAgeStatus,
    ) -> Result<(), StoreError> {
        let patch = serde_json::json!({ "status": status });
        self.sealed_ages(namespace)
            .patch_status(name, &PatchParams::apply(CONTROLLER_NAME), &Patch::Merge(patch))
            .await?;
        Ok(())
    }
}
