//! # Controller
//!
//! Reconciliation logic, age decryption and the probe server.

pub mod backoff;
pub mod parser;
pub mod reconciler;
pub mod server;
