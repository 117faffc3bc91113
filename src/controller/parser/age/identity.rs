//! # age Identity Parsing
//!
//! Accepts a bare `AGE-SECRET-KEY-1...` string or the contents of an identity
//! file as written by `age-keygen` (comments and blank lines are ignored).

use crate::controller::parser::age::error::KeyParseError;
use age::x25519;

/// Parse the first X25519 identity found in `text`
pub fn parse_identity(text: &str) -> Result<x25519::Identity, KeyParseError> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or(KeyParseError::NoIdentity)?;

    line.parse::<x25519::Identity>()
        .map_err(|reason| KeyParseError::Invalid {
            reason: reason.to_string(),
        })
}
