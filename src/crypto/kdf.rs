// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! Password-based key derivation.
//!
//! PBKDF2-HMAC-SHA256 with a deliberately high iteration count: the slow
//! stretch is the point, making offline password search expensive. A fast
//! general-purpose hash here would be a correctness bug, not an
//! optimization. Derivation runs once per login and takes on the order of
//! hundreds of milliseconds.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

/// PBKDF2 iteration count. Lowering this weakens every user's key space.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived symmetric key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Symmetric key derived from a password and a persisted salt.
///
/// Held only in memory; the backing bytes are zeroized when the key is
/// dropped (end of session).
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    /// Raw key bytes, for cipher initialization only.
    pub(crate) fn bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Build a key from raw bytes. Test-only escape hatch so cipher tests
    /// don't have to pay for a real derivation.
    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.write_str("DerivedKey(..)")
    }
}

/// Derive a 32-byte symmetric key from a password and salt.
///
/// Deterministic: the same `(password, salt)` pair always yields the same
/// key. The password is NFKC-normalized first so that visually identical
/// input composed differently (e.g. by another OS keyboard layer) derives
/// the same key.
pub fn derive_key(password: &str, salt: &[u8]) -> DerivedKey {
    let normalized: String = password.nfkc().collect();
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(normalized.as_bytes(), salt, PBKDF2_ITERATIONS, &mut *key);
    DerivedKey(key)
}

/// Generate a fresh random salt from the OS CSPRNG.
///
/// Generated exactly once per user at registration and persisted alongside
/// the user record. If the salt is lost, every token sealed under keys
/// derived from it becomes permanently undecryptable; there is no recovery
/// path.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
