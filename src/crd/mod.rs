//! # Custom Resource Definitions
//!
//! CRD types for the Sealed Age Controller.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `SealedAge` specification and template
//! - `status.rs` - Status types for tracking reconciliation state

mod spec;
mod status;

pub use spec::{SealedAge, SealedAgeSpec, SealedAgeTemplate};
pub use status::{Condition, SealedAgeStatus, CONDITION_READY};
