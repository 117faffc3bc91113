//! # Key Resolution
//!
//! Finds the age private keys available to the controller.
//! Keys live in Secrets in one namespace, selected by a single label.

use crate::constants::PRIVATE_KEY_FIELD;
use crate::controller::parser::age::{parse_identity, DecryptionKey, KeyParseError};
use crate::controller::reconciler::store::{ClusterStore, StoreError};
use age::x25519;
use k8s_openapi::api::core::v1::Secret;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

/// Where the key pool lives: a namespace and one `key=value` label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPoolSelector {
    namespace: String,
    label_key: String,
    label_value: String,
}

impl KeyPoolSelector {
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        label_key: impl Into<String>,
        label_value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            label_key: label_key.into(),
            label_value: label_value.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Label selector in API server syntax, e.g. `app=age-key`
    #[must_use]
    pub fn label_selector(&self) -> String {
        format!("{}={}", self.label_key, self.label_value)
    }
}

/// One key-pool Secret, reduced to its name and private key bytes.
///
/// The key bytes are wiped when the candidate is dropped.
pub struct KeyCandidate {
    name: String,
    private: Option<Zeroizing<Vec<u8>>>,
}

impl std::fmt::Debug for KeyCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCandidate")
            .field("name", &self.name)
            .field("private", &self.private.as_ref().map(|_| "***"))
            .finish()
    }
}

impl KeyCandidate {
    #[must_use]
    pub fn new(name: impl Into<String>, private: Option<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            private: private.map(Zeroizing::new),
        }
    }

    /// Project a key-pool Secret onto its `private` field
    #[must_use]
    pub fn from_secret(secret: &Secret) -> Self {
        let name = secret.metadata.name.clone().unwrap_or_default();
        let private = secret
            .data
            .as_ref()
            .and_then(|data| data.get(PRIVATE_KEY_FIELD))
            .map(|bytes| bytes.0.clone());
        Self::new(name, private)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl DecryptionKey for KeyCandidate {
    fn key_id(&self) -> &str {
        &self.name
    }

    fn identity(&self) -> Result<x25519::Identity, KeyParseError> {
        let bytes = self.private.as_ref().ok_or(KeyParseError::MissingPrivateKey {
            field: PRIVATE_KEY_FIELD,
        })?;
        let text = std::str::from_utf8(bytes)
            .ok()
            .ok_or(KeyParseError::NotUtf8)?;
        parse_identity(text)
    }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error(
        "failed to list key Secrets in namespace '{namespace}' with selector '{selector}': {source}"
    )]
    List {
        namespace: String,
        selector: String,
        #[source]
        source: StoreError,
    },
}

/// Reads the key pool through a [`ClusterStore`]
pub struct KeyResolver<'a> {
    store: &'a dyn ClusterStore,
}

impl std::fmt::Debug for KeyResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver").finish_non_exhaustive()
    }
}

impl<'a> KeyResolver<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ClusterStore) -> Self {
        Self { store }
    }

    /// List the current key candidates.
    ///
    /// An empty pool is `Ok(vec![])`; only a failed list call is an error.
    /// Candidates keep the order the store returned them in.
    pub async fn resolve(
        &self,
        selector: &KeyPoolSelector,
    ) -> Result<Vec<KeyCandidate>, ResolutionError> {
        let label_selector = selector.label_selector();
        let secrets = self
            .store
            .list_secrets(selector.namespace(), &label_selector)
            .await
            .map_err(|source| ResolutionError::List {
                namespace: selector.namespace().to_string(),
                selector: label_selector.clone(),
                source,
            })?;

        let candidates: Vec<KeyCandidate> =
            secrets.iter().map(KeyCandidate::from_secret).collect();
        debug!(
            namespace = selector.namespace(),
            selector = %label_selector,
            count = candidates.len(),
            "Resolved key pool"
        );
        Ok(candidates)
    }
}
