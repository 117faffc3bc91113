//! # age Decryption Error Types

use thiserror::Error;

/// Decryption of a single ciphertext failed with every candidate key.
///
/// Per-key reasons are only logged; callers learn how many keys were tried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecryptError {
    #[error("failed to decrypt with any available key ({attempted} attempted, {skipped} skipped)")]
    NoKeySucceeded { attempted: usize, skipped: usize },
}

/// A key candidate could not be turned into an age identity
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("missing '{field}' field")]
    MissingPrivateKey { field: &'static str },
    #[error("private key is not valid UTF-8")]
    NotUtf8,
    #[error("no AGE-SECRET-KEY line found")]
    NoIdentity,
    #[error("invalid age identity: {reason}")]
    Invalid { reason: String },
}

impl KeyParseError {
    /// Short label used for metrics and structured logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyParseError::MissingPrivateKey { .. } => "missing_private_key",
            KeyParseError::NotUtf8 => "not_utf8",
            KeyParseError::NoIdentity => "no_identity",
            KeyParseError::Invalid { .. } => "invalid_identity",
        }
    }
}
