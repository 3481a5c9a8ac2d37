// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! Authenticated encryption into self-contained printable tokens.
//!
//! ## Token Format
//!
//! ```text
//! base64url( version (1 byte) | timestamp (8 bytes BE, unix seconds)
//!          | nonce (12 bytes) | AES-256-GCM ciphertext+tag )
//! ```
//!
//! The timestamp records when the token was sealed. The whole header
//! (version and timestamp) is bound into the GCM tag as associated data,
//! so header tampering fails authentication like any other corruption;
//! the timestamp carries no expiry semantics and is not read back on
//! open.
//!
//! ## Failure Model
//!
//! [`open`] verifies the GCM tag before releasing any plaintext. Wrong key,
//! corrupted ciphertext, truncated token, and tampered tag all yield the
//! same opaque [`DecryptError`] - deliberately indistinguishable, so a
//! caller (or an attacker reading error output) learns nothing about *why*
//! a token failed to open.
//!
//! Empty plaintext seals to the empty token, so absence-of-data and an
//! "encrypted empty string" are indistinguishable by design. Callers that
//! care about emptiness must check before sealing, not after opening.

use aes_gcm::aead::{Aead, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use rand::RngCore;

use super::kdf::DerivedKey;

/// Current token format version.
const TOKEN_VERSION: u8 = 1;

/// AES-GCM standard nonce length.
const NONCE_LEN: usize = 12;

/// Version byte + big-endian timestamp; authenticated as associated data.
const AAD_LEN: usize = 1 + 8;

/// version + timestamp + nonce.
const HEADER_LEN: usize = AAD_LEN + NONCE_LEN;

/// GCM authentication tag length; a valid token is never shorter than
/// header + tag.
const TAG_LEN: usize = 16;

/// A token failed to open.
///
/// This is a normal, expected outcome (a mistyped password surfaces here)
/// and is always recoverable. It intentionally carries no detail about the
/// cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("decryption failed")]
pub struct DecryptError;

/// Seal a plaintext string into a printable token.
///
/// Pure function of `(key, plaintext, fresh randomness)`: every call draws
/// a new random nonce, so sealing the same plaintext twice yields
/// different tokens. The empty string seals to the empty token.
pub fn seal(key: &DerivedKey, plaintext: &str) -> String {
    if plaintext.is_empty() {
        return String::new();
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.bytes()));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let timestamp = Utc::now().timestamp().max(0) as u64;

    let mut aad = [0u8; AAD_LEN];
    aad[0] = TOKEN_VERSION;
    aad[1..].copy_from_slice(&timestamp.to_be_bytes());

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext.as_bytes(),
                aad: &aad,
            },
        )
        .expect("AES-GCM encryption failed (bug)");

    let mut raw = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    raw.extend_from_slice(&aad);
    raw.extend_from_slice(&nonce_bytes);
    raw.extend_from_slice(&ciphertext);

    Base64UrlUnpadded::encode_string(&raw)
}

/// Open a token, verifying its integrity tag before releasing plaintext.
///
/// The empty token opens to the empty string (see module docs). Any other
/// failure - wrong key, tampering, truncation, unknown version - is the
/// same [`DecryptError`].
pub fn open(key: &DerivedKey, token: &str) -> Result<String, DecryptError> {
    if token.is_empty() {
        return Ok(String::new());
    }

    let raw = Base64UrlUnpadded::decode_vec(token).map_err(|_| DecryptError)?;
    if raw.len() < HEADER_LEN + TAG_LEN || raw[0] != TOKEN_VERSION {
        return Err(DecryptError);
    }

    let aad = &raw[..AAD_LEN];
    let nonce = &raw[AAD_LEN..HEADER_LEN];
    let ciphertext = &raw[HEADER_LEN..];

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.bytes()));
    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| DecryptError)?;

    // We only ever seal valid UTF-8; a post-auth decode failure still must
    // not leak partial plaintext.
    String::from_utf8(plaintext).map_err(|_| DecryptError)
}
