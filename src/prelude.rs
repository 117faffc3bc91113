//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use sealed_age_controller::prelude::*;
//! ```

pub use crate::crd::*;

pub use crate::controller::reconciler::{
    reconcile, reconcile_sealed_age, ClusterStore, KeyCandidate, KeyPoolSelector, KubeStore,
    Reconciled, Reconciler, ReconcilerError, StatusWrite, StoreError,
};

pub use crate::controller::parser::age::{decrypt, DecryptError, Decrypted, DecryptionKey};

pub use crate::config::{ControllerConfig, ServerConfig};
