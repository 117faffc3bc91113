//! # Reconciler
//!
//! Turns a SealedAge into a Secret.
//!
//! - `keys` - key pool lookup
//! - `materialize` - create or update the derived Secret
//! - `status` - best-effort status write-back
//! - `store` - cluster access seam
//! - `reconcile` - one reconciliation attempt
//! - `types` - context and error types

pub mod keys;
pub mod materialize;
pub mod reconcile;
pub mod status;
pub mod store;
pub mod types;

pub use keys::{KeyCandidate, KeyPoolSelector, KeyResolver, ResolutionError};
pub use materialize::{materialize, MaterializeError, MaterializedSecret};
pub use reconcile::{reconcile, reconcile_sealed_age};
pub use status::{build_status, report_status, StatusWrite};
pub use store::{ClusterStore, KubeStore, StoreError};
pub use types::{Reconciled, Reconciler, ReconcilerError};
