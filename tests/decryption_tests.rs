//! # Decryption Tests
//!
//! The decryption engine driven by key-pool candidates built from Secrets.

mod common;

use common::*;
use sealed_age_controller::controller::parser::age::{decrypt, DecryptError, Framing};
use sealed_age_controller::controller::reconciler::KeyCandidate;

fn candidates(secrets: &[k8s_openapi::api::core::v1::Secret]) -> Vec<KeyCandidate> {
    secrets.iter().map(KeyCandidate::from_secret).collect()
}

#[test]
fn test_first_working_key_wins_in_any_order() {
    let (k1, r1) = age_key();
    let (k2, _) = age_key();
    let (k3, _) = age_key();
    let ciphertext = armored(&r1, b"payload");

    let orders = [
        vec![key_secret("k1", Some(&k1)), key_secret("k2", Some(&k2)), key_secret("k3", Some(&k3))],
        vec![key_secret("k2", Some(&k2)), key_secret("k1", Some(&k1)), key_secret("k3", Some(&k3))],
        vec![key_secret("k3", Some(&k3)), key_secret("k2", Some(&k2)), key_secret("k1", Some(&k1))],
    ];
    for secrets in orders {
        let keys = candidates(&secrets);
        let result = decrypt(&ciphertext, &keys, &[]).expect("decrypts");
        assert_eq!(result.plaintext, b"payload");
        assert_eq!(result.key_id, "k1");
    }
}

#[test]
fn test_armored_with_leading_whitespace() {
    let (k, r) = age_key();
    let ciphertext = format!("\n\t  {}", armored(&r, b"indented"));
    let keys = candidates(&[key_secret("k", Some(&k))]);

    let result = decrypt(&ciphertext, &keys, &[]).expect("decrypts");
    assert_eq!(result.framing, Framing::Armored);
    assert_eq!(result.plaintext, b"indented");
}

#[test]
fn test_multiline_plaintext_roundtrips() {
    let (k, r) = age_key();
    let plaintext = b"line one\nline two\n\x00binary tail";
    let keys = candidates(&[key_secret("k", Some(&k))]);
    let result = decrypt(&armored(&r, plaintext), &keys, &[]).expect("decrypts");
    assert_eq!(result.plaintext, plaintext);
}

#[test]
fn test_mixed_pool_with_broken_entries() {
    let (good, r) = age_key();
    let secrets = [
        key_secret("no-private", None),
        key_secret("garbage", Some("definitely not a key")),
        key_secret("good", Some(&good)),
    ];
    let keys = candidates(&secrets);
    let result = decrypt(&armored(&r, b"ok"), &keys, &[]).expect("decrypts");
    assert_eq!(result.key_id, "good");
}

#[test]
fn test_no_working_key_reports_counts() {
    let (_, r) = age_key();
    let (wrong_a, _) = age_key();
    let (wrong_b, _) = age_key();
    let secrets = [
        key_secret("a", Some(&wrong_a)),
        key_secret("b", Some(&wrong_b)),
        key_secret("c", None),
    ];
    let keys = candidates(&secrets);
    let recipients = vec![r.to_string()];

    let err = decrypt(&armored(&r, b"x"), &keys, &recipients).unwrap_err();
    assert_eq!(
        err,
        DecryptError::NoKeySucceeded {
            attempted: 2,
            skipped: 1
        }
    );
}

#[test]
fn test_corrupted_armor_body_fails_cleanly() {
    let (k, r) = age_key();
    let good = armored(&r, b"x");
    let corrupted: String = good
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 1 {
                let flipped = if line.starts_with('A') { "B" } else { "A" };
                format!("{flipped}{}\n", &line[1..])
            } else {
                format!("{line}\n")
            }
        })
        .collect();
    assert_ne!(corrupted, good);

    let keys = candidates(&[key_secret("k", Some(&k))]);
    let err = decrypt(&corrupted, &keys, &[]).unwrap_err();
    assert_eq!(
        err,
        DecryptError::NoKeySucceeded {
            attempted: 1,
            skipped: 0
        }
    );
}

#[test]
fn test_native_header_without_body_fails_cleanly() {
    let (k, r) = age_key();
    let keys = candidates(&[key_secret("k", Some(&k))]);
    // Header without a valid stanza or MAC
    let header_only = format!("age-encryption.org/v1\n-> X25519 {r}\n");
    let err = decrypt(&header_only, &keys, &[]).unwrap_err();
    assert_eq!(
        err,
        DecryptError::NoKeySucceeded {
            attempted: 1,
            skipped: 0
        }
    );
}
