//! # age
//!
//! Decryption of age ciphertexts with a pool of X25519 identities.
//! Framing is detected per ciphertext (armored, native, base64-wrapped native).

pub mod decrypt;
pub mod error;
pub mod framing;
pub mod identity;

pub use decrypt::{decrypt, Decrypted, DecryptionKey};
pub use error::{DecryptError, KeyParseError};
pub use framing::Framing;
pub use identity::parse_identity;
