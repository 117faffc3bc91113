//! # SealedAge Spec
//!
//! Main CRD specification types and default values.

use crate::constants::DEFAULT_SECRET_TYPE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// SealedAge Custom Resource Definition
///
/// Declares a set of age-encrypted values that the controller decrypts into a
/// Kubernetes Secret with the same name and namespace.
///
/// # Example
///
/// ```yaml
/// apiVersion: security.age.io/v1alpha1
/// kind: SealedAge
/// metadata:
///   name: db-credentials
///   namespace: default
/// spec:
///   encryptedData:
///     password: |
///       -----BEGIN AGE ENCRYPTED FILE-----
///       YWdlLWVuY3J5cHRpb24ub3JnL3YxCi0+IFgyNTUxOSB...
///       -----END AGE ENCRYPTED FILE-----
///   template:
///     type: Opaque
/// ```
#[derive(kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "SealedAge",
    group = "security.age.io",
    version = "v1alpha1",
    namespaced,
    status = "crate::crd::SealedAgeStatus",
    shortname = "sea",
    printcolumn = r#"{"name":"Secret", "type":"string", "jsonPath":".status.secretName"}"#,
    printcolumn = r#"{"name":"Generation", "type":"integer", "jsonPath":".metadata.generation"}"#,
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SealedAgeSpec {
    /// Encrypted values keyed by the Secret data key they decrypt into.
    /// Each value is an ASCII-armored age file, a native age file, or a
    /// base64-encoded native age file.
    pub encrypted_data: BTreeMap<String, String>,
    /// Template for the generated Secret
    #[serde(default)]
    pub template: SealedAgeTemplate,
    /// age recipients the values were encrypted to.
    /// Informational only: logged as a hint, never used to pick keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,
    /// Reserved policy flag for restoring the Secret after deletion.
    /// Accepted but not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_on_delete: Option<bool>,
}

/// Settings applied to the generated Secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
pub struct SealedAgeTemplate {
    /// Secret type (e.g. `Opaque`, `kubernetes.io/dockerconfigjson`).
    /// Defaults to `Opaque` when empty or absent.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
}

impl SealedAgeSpec {
    /// Secret type requested by the template, falling back to `Opaque`
    #[must_use]
    pub fn secret_type(&self) -> &str {
        match self.template.secret_type.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => DEFAULT_SECRET_TYPE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_from_yaml(yaml: &str) -> SealedAgeSpec {
        serde_yaml::from_str(yaml).expect("valid spec yaml")
    }

    #[test]
    fn test_secret_type_defaults_to_opaque() {
        let spec = spec_from_yaml("encryptedData: {}\n");
        assert_eq!(spec.secret_type(), "Opaque");
    }

    #[test]
    fn test_secret_type_empty_string_is_opaque() {
        let spec = spec_from_yaml("encryptedData: {}\ntemplate:\n  type: \"\"\n");
        assert_eq!(spec.secret_type(), "Opaque");
    }

    #[test]
    fn test_secret_type_from_template() {
        let spec = spec_from_yaml(
            "encryptedData: {}\ntemplate:\n  type: kubernetes.io/basic-auth\n",
        );
        assert_eq!(spec.secret_type(), "kubernetes.io/basic-auth");
    }

    #[test]
    fn test_optional_fields_deserialize() {
        let spec = spec_from_yaml(
            "encryptedData:\n  password: abc\nrecipients:\n  - age1xyz\nrestoreOnDelete: true\n",
        );
        assert_eq!(spec.encrypted_data.get("password").map(String::as_str), Some("abc"));
        assert_eq!(spec.recipients, vec!["age1xyz".to_string()]);
        assert_eq!(spec.restore_on_delete, Some(true));
    }

    #[test]
    fn test_missing_encrypted_data_is_rejected() {
        let result = serde_yaml::from_str::<SealedAgeSpec>("recipients: []\n");
        assert!(result.is_err());
    }
}
