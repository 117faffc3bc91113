//! # SealedAge Status
//!
//! Observed state written back by the controller after a successful decryption.

use serde::{Deserialize, Serialize};

/// Condition type reported on every successful reconciliation
pub const CONDITION_READY: &str = "Ready";

/// Status of the SealedAge resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SealedAgeStatus {
    /// Generation of the spec that was last decrypted successfully
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// Name of the materialized Secret (same as the SealedAge)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Time of the last successful materialization (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_decrypted_time: Option<String>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

impl SealedAgeStatus {
    /// Look up a condition by type
    #[must_use]
    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.r#type == condition_type)
    }

    /// Insert or replace the condition of the same type.
    ///
    /// `lastTransitionTime` is carried over when the status value is unchanged.
    pub fn set_condition(&mut self, mut condition: Condition) {
        match self
            .conditions
            .iter_mut()
            .find(|c| c.r#type == condition.r#type)
        {
            Some(existing) => {
                if existing.status == condition.status {
                    condition.last_transition_time = existing.last_transition_time.clone();
                }
                *existing = condition;
            }
            None => self.conditions.push(condition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(status: &str, at: &str) -> Condition {
        Condition {
            r#type: CONDITION_READY.to_string(),
            status: status.to_string(),
            last_transition_time: Some(at.to_string()),
            reason: Some("Decrypted".to_string()),
            message: None,
        }
    }

    #[test]
    fn test_set_condition_inserts_when_absent() {
        let mut status = SealedAgeStatus::default();
        status.set_condition(ready("True", "t1"));
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.condition(CONDITION_READY).map(|c| c.status.as_str()), Some("True"));
    }

    #[test]
    fn test_set_condition_keeps_transition_time_when_status_unchanged() {
        let mut status = SealedAgeStatus::default();
        status.set_condition(ready("True", "t1"));
        status.set_condition(ready("True", "t2"));
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(
            status.conditions[0].last_transition_time.as_deref(),
            Some("t1")
        );
    }

    #[test]
    fn test_set_condition_updates_transition_time_on_flip() {
        let mut status = SealedAgeStatus::default();
        status.set_condition(ready("False", "t1"));
        status.set_condition(ready("True", "t2"));
        assert_eq!(
            status.conditions[0].last_transition_time.as_deref(),
            Some("t2")
        );
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = SealedAgeStatus {
            observed_generation: Some(3),
            secret_name: Some("db".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&status).expect("serializable");
        assert_eq!(json["observedGeneration"], 3);
        assert_eq!(json["secretName"], "db");
        assert!(json.get("lastDecryptedTime").is_none());
    }
}
