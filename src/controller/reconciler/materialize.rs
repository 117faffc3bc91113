//! # Secret Materialization
//!
//! Creates or updates the Secret derived from a SealedAge.
//!
//! - Same name and namespace as the owner
//! - Existing data keys are kept; decrypted fields overwrite same-named keys
//! - Type comes from `spec.template.type`, `Opaque` when unset
//! - The owner is set as the controller reference so the Secret is collected with it
//! - Exactly one write: create when absent, replace when present

use crate::controller::reconciler::store::{ClusterStore, StoreError};
use crate::crd::SealedAge;
use crate::observability::metrics;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("SealedAge is missing metadata.{field}")]
    MissingMetadata { field: &'static str },
    #[error("Secret {namespace}/{name} is already controlled by {kind} '{owner}'")]
    OwnedByOther {
        namespace: String,
        name: String,
        kind: String,
        owner: String,
    },
    #[error("failed to read Secret {namespace}/{name}: {source}")]
    Read {
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to create Secret {namespace}/{name}: {source}")]
    Create {
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to update Secret {namespace}/{name}: {source}")]
    Update {
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },
}

/// The Secret as written, and whether it was newly created
#[derive(Debug, Clone)]
pub struct MaterializedSecret {
    pub secret: Secret,
    pub created: bool,
}

/// Write `fields` into the Secret owned by `owner`
pub async fn materialize(
    store: &dyn ClusterStore,
    owner: &SealedAge,
    fields: BTreeMap<String, Vec<u8>>,
) -> Result<MaterializedSecret, MaterializeError> {
    let name = owner
        .metadata
        .name
        .clone()
        .ok_or(MaterializeError::MissingMetadata { field: "name" })?;
    let namespace = owner
        .namespace()
        .ok_or(MaterializeError::MissingMetadata { field: "namespace" })?;
    let owner_ref = owner
        .controller_owner_ref(&())
        .ok_or(MaterializeError::MissingMetadata { field: "uid" })?;
    let owner_ref = OwnerReference {
        block_owner_deletion: Some(true),
        ..owner_ref
    };

    let existing = store
        .get_secret(&namespace, &name)
        .await
        .map_err(|source| MaterializeError::Read {
            namespace: namespace.clone(),
            name: name.clone(),
            source,
        })?;

    let created = existing.is_none();
    let mut secret = existing.unwrap_or_else(|| Secret {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace.clone()),
            ..Default::default()
        },
        ..Default::default()
    });

    set_controller_reference(&mut secret, owner_ref, &namespace, &name)?;

    let data = secret.data.get_or_insert_with(BTreeMap::new);
    for (key, value) in fields {
        data.insert(key, ByteString(value));
    }
    secret.type_ = Some(owner.spec.secret_type().to_string());

    let written = if created {
        let written = store
            .create_secret(&namespace, &secret)
            .await
            .map_err(|source| MaterializeError::Create {
                namespace: namespace.clone(),
                name: name.clone(),
                source,
            })?;
        metrics::increment_secrets_written("create");
        info!(secret.namespace = %namespace, secret.name = %name, "Created Secret");
        written
    } else {
        let written = store
            .replace_secret(&namespace, &name, &secret)
            .await
            .map_err(|source| MaterializeError::Update {
                namespace: namespace.clone(),
                name: name.clone(),
                source,
            })?;
        metrics::increment_secrets_written("update");
        info!(secret.namespace = %namespace, secret.name = %name, "Updated Secret");
        written
    };

    Ok(MaterializedSecret {
        secret: written,
        created,
    })
}

/// Insert or refresh `owner_ref` as the controller reference.
///
/// Non-controller references are left alone. A controller reference to a
/// different object is refused.
fn set_controller_reference(
    secret: &mut Secret,
    owner_ref: OwnerReference,
    namespace: &str,
    name: &str,
) -> Result<(), MaterializeError> {
    let refs = secret.metadata.owner_references.get_or_insert_with(Vec::new);

    if let Some(other) = refs
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != owner_ref.uid)
    {
        return Err(MaterializeError::OwnedByOther {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind: other.kind.clone(),
            owner: other.name.clone(),
        });
    }

    refs.retain(|r| r.uid != owner_ref.uid);
    refs.push(owner_ref);
    Ok(())
}
