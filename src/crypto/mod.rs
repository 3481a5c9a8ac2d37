// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! # Credential-Derived Encryption Layer
//!
//! Everything persisted for a user is sealed under a symmetric key derived
//! from that user's password. Nothing key-shaped ever touches disk.
//!
//! ## Security Model
//!
//! - The derived key exists only in process memory for the session lifetime
//!   and is zeroized on drop
//! - The persisted password verifier is an *independently* salted hash; it
//!   decides login success and nothing else
//! - A wrong password is observable only as a decryption failure, never as
//!   a key-mismatch error
//! - Tokens fail closed: wrong key, truncation, and tampering are all the
//!   same indistinct [`securebox::DecryptError`]
//!
//! ## Layout
//!
//! - [`kdf`] - PBKDF2-HMAC-SHA256 key stretching and salt generation
//! - [`securebox`] - authenticated encryption into printable tokens
//! - [`verifier`] - constant-time password verification for login

pub mod kdf;
pub mod securebox;
pub mod verifier;

pub use kdf::{derive_key, generate_salt, DerivedKey};
pub use securebox::{open, seal, DecryptError};
pub use verifier::PasswordVerifier;
