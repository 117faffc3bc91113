//! # Reconcile
//!
//! One reconciliation attempt for a SealedAge:
//! Load, ResolveKeys, DecryptAll, Materialize, ReportStatus.
//!
//! Nothing is written unless every field decrypts.

use crate::constants::KEY_POOL_EMPTY_REQUEUE_SECS;
use crate::controller::parser::age::decrypt;
use crate::controller::reconciler::keys::{KeyCandidate, KeyResolver};
use crate::controller::reconciler::materialize::materialize;
use crate::controller::reconciler::status::{build_status, report_status};
use crate::controller::reconciler::types::{Reconciled, Reconciler, ReconcilerError};
use crate::crd::SealedAge;
use crate::observability::metrics;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, Instrument};

/// Reconcile the SealedAge `namespace/name` against the current cluster state
pub async fn reconcile_sealed_age(
    ctx: &Reconciler,
    namespace: &str,
    name: &str,
) -> Result<Reconciled, ReconcilerError> {
    let store = ctx.store.as_ref();

    let Some(sealed) = store
        .get_sealed_age(namespace, name)
        .await
        .map_err(|source| ReconcilerError::Load {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source,
        })?
    else {
        debug!("SealedAge no longer exists, nothing to do");
        return Ok(Reconciled::Gone);
    };

    let keys = KeyResolver::new(store).resolve(&ctx.key_pool).await?;
    metrics::set_key_pool_size(keys.len());
    if keys.is_empty() {
        info!(
            key.namespace = ctx.key_pool.namespace(),
            key.selector = %ctx.key_pool.label_selector(),
            "No age keys found, waiting for keys"
        );
        return Ok(Reconciled::AwaitingKeys);
    }

    let fields = decrypt_all(&sealed, &keys)?;

    let materialized = materialize(store, &sealed, fields).await?;
    let secret_name = materialized
        .secret
        .metadata
        .name
        .clone()
        .unwrap_or_else(|| name.to_string());

    let status = build_status(&sealed, &secret_name, chrono::Utc::now());
    let status = report_status(store, &sealed, &status).await;

    Ok(Reconciled::Materialized {
        secret_name,
        created: materialized.created,
        status,
    })
}

/// Decrypt every field in key order; the first failure aborts.
fn decrypt_all(
    sealed: &SealedAge,
    keys: &[KeyCandidate],
) -> Result<BTreeMap<String, Vec<u8>>, ReconcilerError> {
    let mut fields = BTreeMap::new();
    for (field, ciphertext) in &sealed.spec.encrypted_data {
        let decrypted = decrypt(ciphertext, keys, &sealed.spec.recipients).map_err(|source| {
            ReconcilerError::Decryption {
                field: field.clone(),
                source,
            }
        })?;
        info!(
            field = %field,
            key = %decrypted.key_id,
            framing = decrypted.framing.as_str(),
            "Decrypted field"
        );
        fields.insert(field.clone(), decrypted.plaintext);
    }
    Ok(fields)
}

/// Controller entry point: map a reconciliation outcome to the next action
pub async fn reconcile(
    obj: Arc<SealedAge>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();
    let resource_key = format!("{namespace}/{name}");

    let span = info_span!(
        "reconcile",
        resource.name = %name,
        resource.namespace = %namespace,
        resource.generation = obj.metadata.generation.unwrap_or(0)
    );

    metrics::increment_reconciliations();
    let start = Instant::now();
    let result = reconcile_sealed_age(&ctx, &namespace, &name)
        .instrument(span.clone())
        .await;
    metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

    let _guard = span.enter();
    match result? {
        Reconciled::Gone => {
            ctx.reset_backoff(&resource_key);
            Ok(Action::await_change())
        }
        Reconciled::AwaitingKeys => {
            ctx.reset_backoff(&resource_key);
            metrics::increment_requeues("empty_key_pool");
            Ok(Action::requeue(Duration::from_secs(
                KEY_POOL_EMPTY_REQUEUE_SECS,
            )))
        }
        Reconciled::Materialized {
            secret_name,
            created,
            ..
        } => {
            ctx.reset_backoff(&resource_key);
            info!(secret.name = %secret_name, created, "Reconciliation complete");
            Ok(Action::await_change())
        }
    }
}
