//! # Types
//!
//! Core types for the reconciler.

use crate::controller::backoff::ExponentialBackoff;
use crate::controller::parser::age::DecryptError;
use crate::controller::reconciler::keys::{KeyPoolSelector, ResolutionError};
use crate::controller::reconciler::materialize::MaterializeError;
use crate::controller::reconciler::status::StatusWrite;
use crate::controller::reconciler::store::{ClusterStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("failed to load SealedAge {namespace}/{name}: {source}")]
    Load {
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    KeyResolution(#[from] ResolutionError),
    #[error("failed to decrypt field '{field}': {source}")]
    Decryption {
        field: String,
        #[source]
        source: DecryptError,
    },
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

impl ReconcilerError {
    /// Short label used for logs and metrics
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcilerError::Load { .. } => "load",
            ReconcilerError::KeyResolution(_) => "key_resolution",
            ReconcilerError::Decryption { .. } => "decryption",
            ReconcilerError::Materialize(_) => "materialize",
        }
    }
}

/// What a successful reconciliation attempt did
#[derive(Debug)]
pub enum Reconciled {
    /// The SealedAge no longer exists
    Gone,
    /// The key pool is empty; retry later without touching status
    AwaitingKeys,
    Materialized {
        secret_name: String,
        /// `true` when the Secret did not exist before this attempt
        created: bool,
        status: StatusWrite,
    },
}

/// Reconciler context shared by all reconciliations
#[derive(Clone)]
pub struct Reconciler {
    pub store: Arc<dyn ClusterStore>,
    pub key_pool: KeyPoolSelector,
    pub backoff_start: Duration,
    pub backoff_max: Duration,
    // Per-resource error backoff (namespace/name), owned by the error policy
    pub backoff_states: Arc<Mutex<HashMap<String, ExponentialBackoff>>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("key_pool", &self.key_pool)
            .field("backoff_start", &self.backoff_start)
            .field("backoff_max", &self.backoff_max)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        store: Arc<dyn ClusterStore>,
        key_pool: KeyPoolSelector,
        backoff_start: Duration,
        backoff_max: Duration,
    ) -> Self {
        Self {
            store,
            key_pool,
            backoff_start,
            backoff_max,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Next error backoff for a resource, advancing its sequence
    pub fn next_backoff(&self, resource_key: &str) -> Duration {
        match self.backoff_states.lock() {
            Ok(mut states) => states
                .entry(resource_key.to_string())
                .or_insert_with(|| ExponentialBackoff::new(self.backoff_start, self.backoff_max))
                .next_backoff(),
            Err(e) => {
                tracing::warn!("Failed to lock backoff_states: {}, using start backoff", e);
                self.backoff_start
            }
        }
    }

    /// Forget the error backoff of a resource after a success
    pub fn reset_backoff(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(resource_key);
        }
    }
}
