//! # Parser
//!
//! Ciphertext parsing and decryption.

pub mod age;
