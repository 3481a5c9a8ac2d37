// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! Persisted password verifier for the login decision.
//!
//! Deliberately separate from key derivation: the verifier uses its **own**
//! random salt, so the stored hash and the encryption key live in unrelated
//! key spaces. Compromise of the verifier does not hand an attacker the
//! token key, and the derived key itself is never stored or compared.

use base64ct::{Base64UrlUnpadded, Encoding};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use unicode_normalization::UnicodeNormalization;

use super::kdf::{generate_salt, PBKDF2_ITERATIONS};

/// Verifier hash length in bytes.
const HASH_LEN: usize = 32;

/// One-way, independently salted password hash.
///
/// Stored inside the user record; used only to decide login success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordVerifier {
    /// Verifier salt (base64url, 16 bytes); independent of the key salt
    salt: String,
    /// PBKDF2-HMAC-SHA256 digest of the password (base64url, 32 bytes)
    hash: String,
}

impl PasswordVerifier {
    /// Hash a password under a fresh random salt.
    pub fn new(password: &str) -> Self {
        let salt = generate_salt();
        let hash = stretch(password, &salt);
        Self {
            salt: Base64UrlUnpadded::encode_string(&salt),
            hash: Base64UrlUnpadded::encode_string(&hash),
        }
    }

    /// Check a password attempt in constant time.
    ///
    /// Returns `false` for a wrong password or an unreadable stored
    /// verifier; the caller must not distinguish the two.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(salt) = Base64UrlUnpadded::decode_vec(&self.salt) else {
            return false;
        };
        let Ok(stored) = Base64UrlUnpadded::decode_vec(&self.hash) else {
            return false;
        };
        if stored.len() != HASH_LEN {
            return false;
        }

        let computed = stretch(password, &salt);
        computed.ct_eq(&stored[..]).into()
    }
}

fn stretch(password: &str, salt: &[u8]) -> [u8; HASH_LEN] {
    let normalized: String = password.nfkc().collect();
    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(normalized.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);
    hash
}
