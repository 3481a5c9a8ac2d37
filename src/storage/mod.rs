// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! # Record Store
//!
//! Persistence substrate for the vault. The store never sees plaintext
//! beyond the user document itself: goals are written as opaque ciphertext
//! tokens keyed by `(owner, record kind, id)`, and the user document holds
//! only the password verifier, the key salt, and more tokens.
//!
//! Single-writer, single-process, simple key lookups: no query language,
//! no migrations, no concurrent-access guarantees.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//!   users/
//!     {username}.json          # StoredUser (verifier + salt + tokens)
//!   records/{username}/
//!     goals/
//!       {goal_id}.token        # one opaque ciphertext token per goal
//! ```
//!
//! The core consumes the [`RecordStore`] trait; [`FsRecordStore`] is the
//! bundled filesystem implementation with atomic tmp-then-rename writes.

pub mod paths;
pub mod record_store;

pub use paths::StoragePaths;
pub use record_store::{
    FsRecordStore, RecordKind, RecordStore, StorageError, StorageResult,
};
