//! # age Decryption
//!
//! Tries each candidate key against a ciphertext until one succeeds.

use crate::controller::parser::age::error::{DecryptError, KeyParseError};
use crate::controller::parser::age::framing::{self, Framing};
use crate::observability::metrics;
use age::x25519;
use std::io::Read;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info_span};

/// Anything that can be offered to the decryption engine as a key.
///
/// `key_id` names the key in logs and in [`Decrypted::key_id`]. It must not
/// contain key material.
pub trait DecryptionKey {
    fn key_id(&self) -> &str;

    /// Parse the key material into an age identity.
    fn identity(&self) -> Result<x25519::Identity, KeyParseError>;
}

/// Result of a successful decryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    pub plaintext: Vec<u8>,
    /// Identifier of the key that opened the ciphertext
    pub key_id: String,
    pub framing: Framing,
}

/// Why one key failed to open the ciphertext (logged, never returned)
#[derive(Debug, Error)]
enum AttemptError {
    #[error("{0}")]
    Age(#[from] age::DecryptError),
    #[error("reading plaintext: {0}")]
    Read(#[from] std::io::Error),
}

/// Decrypt `ciphertext` with the first candidate that works.
///
/// Candidates are tried in iteration order. Keys without material or with an
/// unparseable identity are skipped; keys that parse but fail to decrypt are
/// counted as attempted. `recipients` is only a hint for the debug logs.
pub fn decrypt<'k, K, I>(
    ciphertext: &str,
    candidates: I,
    recipients: &[String],
) -> Result<Decrypted, DecryptError>
where
    K: DecryptionKey + ?Sized + 'k,
    I: IntoIterator<Item = &'k K>,
{
    let envelope = framing::detect(ciphertext);
    let span = info_span!(
        "age.decrypt",
        ciphertext.size = ciphertext.len(),
        ciphertext.framing = envelope.framing.as_str()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let mut attempted = 0usize;
    let mut skipped = 0usize;

    for candidate in candidates {
        let key_id = candidate.key_id();
        let identity = match candidate.identity() {
            Ok(identity) => identity,
            Err(e) => {
                let outcome = match e {
                    KeyParseError::MissingPrivateKey { .. } => "skipped_missing_key",
                    _ => "skipped_invalid_key",
                };
                debug!(key = %key_id, reason = e.as_str(), "Skipping key: {}", e);
                metrics::increment_key_attempts(outcome);
                skipped += 1;
                continue;
            }
        };

        attempted += 1;
        match open(envelope.framing, &envelope.bytes, &identity) {
            Ok(plaintext) => {
                metrics::increment_key_attempts("succeeded");
                metrics::increment_decryptions();
                metrics::observe_decryption_duration(start.elapsed().as_secs_f64());
                return Ok(Decrypted {
                    plaintext,
                    key_id: key_id.to_string(),
                    framing: envelope.framing,
                });
            }
            Err(e) => {
                debug!(
                    key = %key_id,
                    recipient = %identity.to_public(),
                    expected_recipients = ?recipients,
                    "Key did not decrypt ciphertext: {}",
                    e
                );
                metrics::increment_key_attempts("failed");
            }
        }
    }

    metrics::increment_decryption_errors();
    metrics::observe_decryption_duration(start.elapsed().as_secs_f64());
    Err(DecryptError::NoKeySucceeded { attempted, skipped })
}

fn open(
    framing: Framing,
    bytes: &[u8],
    identity: &x25519::Identity,
) -> Result<Vec<u8>, AttemptError> {
    match framing {
        Framing::Armored => read_all(age::armor::ArmoredReader::new(bytes), identity),
        Framing::Native | Framing::Base64 => read_all(bytes, identity),
    }
}

fn read_all<R: Read>(input: R, identity: &x25519::Identity) -> Result<Vec<u8>, AttemptError> {
    let decryptor = age::Decryptor::new(input)?;
    let mut reader = decryptor.decrypt(std::iter::once(identity as &dyn age::Identity))?;
    let mut plaintext = Vec::new();
    reader.read_to_end(&mut plaintext)?;
    Ok(plaintext)
}
