//! # Runtime
//!
//! Process wiring around the reconciler: startup, the controller watch loop,
//! and the error policy that schedules retries.

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

pub use initialization::{initialize, InitializationResult};
pub use watch_loop::run_watch_loop;
