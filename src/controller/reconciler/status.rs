//! # Status Reporting
//!
//! Best-effort write of the SealedAge status after a successful materialization.
//! A failed status write never fails the reconciliation.
//! A status that would only move `lastDecryptedTime` is not written, since the
//! patch itself would trigger another reconciliation.

use crate::controller::reconciler::store::{ClusterStore, StoreError};
use crate::crd::{Condition, SealedAge, SealedAgeStatus, CONDITION_READY};
use crate::observability::metrics;
use chrono::{DateTime, SecondsFormat, Utc};
use kube::ResourceExt;
use tracing::{debug, warn};

/// Reason set on the Ready condition after a successful decryption
pub const REASON_DECRYPTED: &str = "Decrypted";

/// Outcome of the status write
#[derive(Debug)]
pub enum StatusWrite {
    Written,
    /// The current status already reports this materialization
    Unchanged,
    /// The SealedAge was deleted before the write; nothing to report to
    OwnerGone,
    /// Logged and counted, never propagated
    Failed(StoreError),
}

/// Status describing a successful materialization of `secret_name` at `now`.
///
/// Starts from the current status so unrelated conditions survive.
#[must_use]
pub fn build_status(owner: &SealedAge, secret_name: &str, now: DateTime<Utc>) -> SealedAgeStatus {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut status = owner.status.clone().unwrap_or_default();
    status.observed_generation = owner.metadata.generation;
    status.secret_name = Some(secret_name.to_string());
    status.last_decrypted_time = Some(timestamp.clone());
    status.set_condition(Condition {
        r#type: CONDITION_READY.to_string(),
        status: "True".to_string(),
        last_transition_time: Some(timestamp),
        reason: Some(REASON_DECRYPTED.to_string()),
        message: Some(format!("Secret '{secret_name}' materialized")),
    });
    status
}

/// Write `status` to the owner's status subresource
pub async fn report_status(
    store: &dyn ClusterStore,
    owner: &SealedAge,
    status: &SealedAgeStatus,
) -> StatusWrite {
    let name = owner.name_any();
    let namespace = owner.namespace().unwrap_or_default();

    if owner
        .status
        .as_ref()
        .is_some_and(|current| only_decrypt_time_differs(current, status))
    {
        debug!(
            resource.namespace = %namespace,
            resource.name = %name,
            "SealedAge status already current, skipping update"
        );
        return StatusWrite::Unchanged;
    }

    match store
        .patch_sealed_age_status(&namespace, &name, status)
        .await
    {
        Ok(()) => StatusWrite::Written,
        Err(e) if e.is_not_found() => {
            debug!(
                resource.namespace = %namespace,
                resource.name = %name,
                "SealedAge deleted before status update, skipping"
            );
            StatusWrite::OwnerGone
        }
        Err(e) => {
            warn!(
                resource.namespace = %namespace,
                resource.name = %name,
                "Failed to update SealedAge status: {}",
                e
            );
            metrics::increment_status_write_failures();
            StatusWrite::Failed(e)
        }
    }
}

fn only_decrypt_time_differs(current: &SealedAgeStatus, next: &SealedAgeStatus) -> bool {
    let mut current = current.clone();
    current.last_decrypted_time.clone_from(&next.last_decrypted_time);
    current == *next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::SealedAgeSpec;
    use chrono::TimeZone;

    fn sealed(generation: i64) -> SealedAge {
        let mut obj = SealedAge::new("db", SealedAgeSpec::default());
        obj.metadata.namespace = Some("apps".to_string());
        obj.metadata.generation = Some(generation);
        obj
    }

    #[test]
    fn test_build_status_fresh() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let status = build_status(&sealed(3), "db", now);

        assert_eq!(status.observed_generation, Some(3));
        assert_eq!(status.secret_name.as_deref(), Some("db"));
        assert_eq!(status.last_decrypted_time.as_deref(), Some("2025-01-02T03:04:05Z"));
        let ready = status.condition(CONDITION_READY).expect("ready condition");
        assert_eq!(ready.status, "True");
        assert_eq!(ready.reason.as_deref(), Some(REASON_DECRYPTED));
    }

    #[test]
    fn test_build_status_keeps_transition_time() {
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let mut obj = sealed(1);
        obj.status = Some(build_status(&obj, "db", first));
        obj.metadata.generation = Some(2);
        let status = build_status(&obj, "db", later);

        let ready = status.condition(CONDITION_READY).expect("ready condition");
        assert_eq!(ready.last_transition_time.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(status.last_decrypted_time.as_deref(), Some("2025-06-01T00:00:00Z"));
        assert_eq!(status.observed_generation, Some(2));
        assert_eq!(status.conditions.len(), 1);
    }

    #[test]
    fn test_only_decrypt_time_differs() {
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 30).unwrap();

        let mut obj = sealed(1);
        obj.status = Some(build_status(&obj, "db", first));
        let current = obj.status.clone().expect("status");

        assert!(only_decrypt_time_differs(&current, &build_status(&obj, "db", later)));

        obj.metadata.generation = Some(2);
        assert!(!only_decrypt_time_differs(&current, &build_status(&obj, "db", later)));
        obj.metadata.generation = Some(1);
        assert!(!only_decrypt_time_differs(&current, &build_status(&obj, "renamed", later)));
    }
}
