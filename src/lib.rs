//! Sealed Age Controller Library
//!
//! Decrypts age-encrypted `SealedAge` resources into Kubernetes Secrets.
//!
//! ## Quick Start
//!
//! ```rust
//! use sealed_age_controller::prelude::*;
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod runtime;
