//! # Ciphertext Framing Detection
//!
//! Decides how a ciphertext string from `encryptedData` is fed to the age reader.

use base64::Engine as _;
use std::borrow::Cow;

/// First line of an ASCII-armored age file
pub const ARMOR_HEADER: &str = "-----BEGIN AGE ENCRYPTED FILE-----";

/// Prefix of the native age header line (`age-encryption.org/v1`)
pub const NATIVE_HEADER_PREFIX: &str = "age-encryption.org/";

/// How a ciphertext is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// PEM-style armor, decoded through `age::armor::ArmoredReader`
    Armored,
    /// Native age envelope, read as is
    Native,
    /// Native envelope wrapped in base64
    Base64,
}

impl Framing {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::Armored => "armored",
            Framing::Native => "native",
            Framing::Base64 => "base64",
        }
    }
}

/// Ciphertext bytes ready for the age reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub framing: Framing,
    pub bytes: Cow<'a, [u8]>,
}

/// Detect the framing of `ciphertext`.
///
/// Leading whitespace (space, tab, CR, LF) is ignored. Text that is neither
/// armored nor a native header is treated as base64 only when it decodes to
/// a native header; otherwise it is passed through untouched and left for the
/// age reader to reject.
#[must_use]
pub fn detect(ciphertext: &str) -> Envelope<'_> {
    let trimmed = ciphertext.trim_start_matches([' ', '\t', '\r', '\n']);

    if trimmed.starts_with(ARMOR_HEADER) {
        return Envelope {
            framing: Framing::Armored,
            bytes: Cow::Borrowed(trimmed.as_bytes()),
        };
    }

    if !trimmed.starts_with(NATIVE_HEADER_PREFIX) {
        if let Some(decoded) = decode_base64_envelope(trimmed) {
            return Envelope {
                framing: Framing::Base64,
                bytes: Cow::Owned(decoded),
            };
        }
    }

    Envelope {
        framing: Framing::Native,
        bytes: Cow::Borrowed(trimmed.as_bytes()),
    }
}

fn decode_base64_envelope(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .ok()?;
    decoded
        .starts_with(NATIVE_HEADER_PREFIX.as_bytes())
        .then_some(decoded)
}
