//! Common test utilities
//!
//! An in-memory [`ClusterStore`] with failure injection, plus helpers that
//! generate real age keys and ciphertexts.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use age::secrecy::ExposeSecret;
use age::x25519;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use sealed_age_controller::controller::reconciler::{
    ClusterStore, KeyPoolSelector, Reconciler, StoreError,
};
use sealed_age_controller::crd::{SealedAge, SealedAgeSpec, SealedAgeStatus};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const KEY_NAMESPACE: &str = "sealed-age-system";
pub const APP_NAMESPACE: &str = "apps";

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetSealedAge,
    ListSecrets,
    GetSecret,
    CreateSecret,
    ReplaceSecret,
    PatchStatus,
}

/// Error returned by an injected failure
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NotFound,
    Api(u16),
}

impl Failure {
    fn to_error(self) -> StoreError {
        match self {
            Failure::NotFound => StoreError::NotFound,
            Failure::Api(code) => StoreError::Api {
                code,
                reason: "Injected".to_string(),
                message: format!("injected failure with status {code}"),
            },
        }
    }
}

/// Write recorded by the store, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    CreateSecret(String),
    ReplaceSecret(String),
    PatchStatus(String),
}

#[derive(Default)]
struct State {
    sealed_ages: BTreeMap<(String, String), SealedAge>,
    secrets: BTreeMap<(String, String), Secret>,
    failures: HashMap<Op, Failure>,
    writes: Vec<Write>,
    next_resource_version: u64,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

fn key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put_sealed_age(&self, obj: SealedAge) {
        let ns = obj.metadata.namespace.clone().expect("namespace");
        let name = obj.metadata.name.clone().expect("name");
        self.state.lock().unwrap().sealed_ages.insert((ns, name), obj);
    }

    pub fn delete_sealed_age(&self, namespace: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .sealed_ages
            .remove(&key(namespace, name));
    }

    pub fn put_secret(&self, secret: Secret) {
        let ns = secret.metadata.namespace.clone().expect("namespace");
        let name = secret.metadata.name.clone().expect("name");
        self.state.lock().unwrap().secrets.insert((ns, name), secret);
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&key(namespace, name))
            .cloned()
    }

    pub fn sealed_age(&self, namespace: &str, name: &str) -> Option<SealedAge> {
        self.state
            .lock()
            .unwrap()
            .sealed_ages
            .get(&key(namespace, name))
            .cloned()
    }

    pub fn fail(&self, op: Op, failure: Failure) {
        self.state.lock().unwrap().failures.insert(op, failure);
    }

    pub fn writes(&self) -> Vec<Write> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().unwrap().writes.clear();
    }

    fn check(state: &State, op: Op) -> Result<(), StoreError> {
        match state.failures.get(&op) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

fn matches_selector(secret: &Secret, selector: &str) -> bool {
    let Some((k, v)) = selector.split_once('=') else {
        return false;
    };
    secret
        .metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(k))
        .is_some_and(|value| value == v)
}

#[async_trait]
impl ClusterStore for InMemoryStore {
    async fn get_sealed_age(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<SealedAge>, StoreError> {
        let state = self.state.lock().unwrap();
        Self::check(&state, Op::GetSealedAge)?;
        Ok(state.sealed_ages.get(&key(namespace, name)).cloned())
    }

    async fn list_secrets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Secret>, StoreError> {
        let state = self.state.lock().unwrap();
        Self::check(&state, Op::ListSecrets)?;
        Ok(state
            .secrets
            .iter()
            .filter(|((ns, _), s)| ns == namespace && matches_selector(s, label_selector))
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError> {
        let state = self.state.lock().unwrap();
        Self::check(&state, Op::GetSecret)?;
        Ok(state.secrets.get(&key(namespace, name)).cloned())
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, StoreError> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state, Op::CreateSecret)?;
        let name = secret.metadata.name.clone().expect("name");
        if state.secrets.contains_key(&key(namespace, &name)) {
            return Err(StoreError::Api {
                code: 409,
                reason: "AlreadyExists".to_string(),
                message: format!("secrets \"{name}\" already exists"),
            });
        }
        state.next_resource_version += 1;
        let mut stored = secret.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        stored.metadata.resource_version = Some(state.next_resource_version.to_string());
        state.secrets.insert(key(namespace, &name), stored.clone());
        state.writes.push(Write::CreateSecret(name));
        Ok(stored)
    }

    async fn replace_secret(
        &self,
        namespace: &str,
        name: &str,
        secret: &Secret,
    ) -> Result<Secret, StoreError> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state, Op::ReplaceSecret)?;
        if !state.secrets.contains_key(&key(namespace, name)) {
            return Err(StoreError::NotFound);
        }
        state.next_resource_version += 1;
        let mut stored = secret.clone();
        stored.metadata.resource_version = Some(state.next_resource_version.to_string());
        state.secrets.insert(key(namespace, name), stored.clone());
        state.writes.push(Write::ReplaceSecret(name.to_string()));
        Ok(stored)
    }

    async fn patch_sealed_age_status(
        &self,
        namespace: &str,
        name: &str,
        status: &SealedAgeStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state, Op::PatchStatus)?;
        let obj = state
            .sealed_ages
            .get_mut(&key(namespace, name))
            .ok_or(StoreError::NotFound)?;
        obj.status = Some(status.clone());
        state.writes.push(Write::PatchStatus(name.to_string()));
        Ok(())
    }
}

/// A fresh X25519 identity as text, with its recipient
pub fn age_key() -> (String, x25519::Recipient) {
    let identity = x25519::Identity::generate();
    let recipient = identity.to_public();
    (identity.to_string().expose_secret().to_string(), recipient)
}

pub fn armored(recipient: &x25519::Recipient, plaintext: &[u8]) -> String {
    age::encrypt_and_armor(recipient, plaintext).expect("encrypt")
}

/// Native binary age envelope
pub fn native(recipient: &x25519::Recipient, plaintext: &[u8]) -> Vec<u8> {
    age::encrypt(recipient, plaintext).expect("encrypt")
}

/// Key-pool Secret labelled `app=age-key`; `private` is omitted when `None`
pub fn key_secret(name: &str, private: Option<&str>) -> Secret {
    let mut data = BTreeMap::new();
    if let Some(private) = private {
        data.insert("private".to_string(), ByteString(private.as_bytes().to_vec()));
    }
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(KEY_NAMESPACE.to_string()),
            labels: Some(BTreeMap::from([(
                "app".to_string(),
                "age-key".to_string(),
            )])),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

pub fn sealed_age(name: &str, fields: &[(&str, String)]) -> SealedAge {
    let spec = SealedAgeSpec {
        encrypted_data: fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect(),
        ..Default::default()
    };
    let mut obj = SealedAge::new(name, spec);
    obj.metadata.namespace = Some(APP_NAMESPACE.to_string());
    obj.metadata.uid = Some(format!("uid-{name}"));
    obj.metadata.generation = Some(1);
    obj
}

pub fn reconciler(store: Arc<InMemoryStore>) -> Reconciler {
    Reconciler::new(
        store,
        KeyPoolSelector::new(KEY_NAMESPACE, "app", "age-key"),
        Duration::from_millis(100),
        Duration::from_secs(1),
    )
}

/// Secret data as UTF-8 strings
pub fn data_of(secret: &Secret) -> BTreeMap<String, String> {
    secret
        .data
        .as_ref()
        .map(|data| {
            data.iter()
                .map(|(k, v)| (k.clone(), String::from_utf8(v.0.clone()).expect("utf8")))
                .collect()
        })
        .unwrap_or_default()
}
