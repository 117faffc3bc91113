//! # Error Policy
//!
//! Error handling and backoff for the controller watch loop.
//! Reconciliation errors requeue with a per-resource exponential backoff;
//! watch stream errors are classified and logged.
//! Requeue targets that no longer exist drop their backoff state.

use crate::controller::reconciler::{Reconciler, ReconcilerError};
use crate::crd::SealedAge;
use crate::observability::metrics;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Requeue a failed reconciliation with exponential backoff.
///
/// Backoff state is tracked per resource so one failing SealedAge does not
/// slow down the others. It is cleared on the next successful reconciliation.
pub fn handle_reconciliation_error(
    obj: Arc<SealedAge>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.reconciliation_error",
        resource.name = %name,
        resource.namespace = %namespace,
        error.kind = error.as_str()
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation failed for {}/{}: {}", namespace, name, error);
    metrics::increment_reconciliation_errors();

    let delay = ctx.next_backoff(&format!("{namespace}/{name}"));
    let next_attempt =
        chrono::Utc::now() + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero());
    info!(
        "Retrying in {}ms (next attempt at {})",
        delay.as_millis(),
        next_attempt.to_rfc3339()
    );

    metrics::increment_requeues("error_backoff");
    Action::requeue(delay)
}

/// Drop the backoff state of a requeued object that has left the cache.
///
/// An object deleted while in error backoff is never reconciled again, so its
/// entry would otherwise stay for the life of the process.
pub fn handle_object_not_found(ctx: &Reconciler, namespace: Option<&str>, name: &str) {
    let namespace = namespace.unwrap_or_default();
    debug!(
        resource.namespace = %namespace,
        resource.name = %name,
        "Requeued SealedAge no longer exists, dropping its backoff"
    );
    ctx.reset_backoff(&format!("{namespace}/{name}"));
}

/// Kind of failure reported by the controller stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorKind {
    Unauthorized,
    Expired,
    TooManyRequests,
    NotFound,
    Other,
}

/// Classify a controller stream error from its debug rendering
#[must_use]
pub fn classify_watch_error(error: &str) -> WatchErrorKind {
    let is_not_found = error.contains("ObjectNotFound")
        || error.contains("404")
        || error.contains("not found");
    if is_not_found {
        WatchErrorKind::NotFound
    } else if error.contains("401") || error.contains("Unauthorized") {
        WatchErrorKind::Unauthorized
    } else if error.contains("410")
        || error.contains("too old resource version")
        || error.contains("Expired")
    {
        WatchErrorKind::Expired
    } else if error.contains("429") || error.contains("TooManyRequests") {
        WatchErrorKind::TooManyRequests
    } else {
        WatchErrorKind::Other
    }
}

/// Log a controller stream error at the level its kind deserves
pub fn log_watch_error(error: &str) -> WatchErrorKind {
    let kind = classify_watch_error(error);
    match kind {
        WatchErrorKind::Unauthorized => error!(
            "Watch authentication failed (401) - check the ClusterRole binding for {}: {}",
            crate::constants::CONTROLLER_NAME,
            error
        ),
        WatchErrorKind::Expired => {
            warn!("Watch resource version expired (410), watch will resync");
        }
        WatchErrorKind::TooManyRequests => {
            warn!("API server throttling or reinitializing (429): {}", error);
        }
        WatchErrorKind::NotFound => {
            warn!(
                "Object not found (404) - normal for deleted resources, or the CRD is missing: {}",
                error
            );
        }
        WatchErrorKind::Other => error!("Controller stream error: {}", error),
    }
    kind
}
