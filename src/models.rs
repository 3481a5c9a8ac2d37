// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! # Core Data Models
//!
//! This module defines the persisted document types of the vault. All types
//! derive `Serialize` and `Deserialize`; goals are stored as a single opaque
//! ciphertext token per goal, users as one JSON document per user.
//!
//! ## Derived Fields
//!
//! `Goal::current` and `Entry::accumulated` are **derived** values. They are
//! never written directly by a caller; the ledger engine recomputes both from
//! the full entry history after every mutation (see [`crate::ledger::engine`]).
//!
//! ## Model Categories
//!
//! - **Goals**: savings targets with an append-and-recompute entry history
//! - **Entries**: timestamped contributions, withdrawals, and corrections
//! - **Users**: login verifier, key salt, and encrypted profile/aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::verifier::PasswordVerifier;

// =============================================================================
// Goal Models
// =============================================================================

/// Classification of a goal's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    /// Balance counts toward the user's aggregate net worth
    NetWorth,
    /// A recurring savings target; excluded from the aggregate
    PeriodicContribution,
}

/// A savings goal with a full transaction history.
///
/// `current` and each entry's `accumulated` are recomputed by the ledger
/// engine; the only user-driven mutations are entry additions, edits, and
/// removals, always followed by a full rebuild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    /// Opaque stable identifier (UUID)
    pub id: String,
    /// User-facing goal name
    pub name: String,
    /// Whether the balance counts toward net worth
    pub kind: GoalKind,
    /// Monetary target, >= 0
    pub target: f64,
    /// Running balance after the chronologically last entry (derived)
    pub current: f64,
    /// Transaction history; chronological order is restored on rebuild
    pub history: Vec<Entry>,
    /// System-created goal that resists deletion
    #[serde(default)]
    pub is_default: bool,
}

impl Goal {
    /// Create an empty goal with a fresh UUID.
    pub fn new(name: impl Into<String>, kind: GoalKind, target: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            target,
            current: 0.0,
            history: Vec::new(),
            is_default: false,
        }
    }
}

// =============================================================================
// Entry Models
// =============================================================================

/// How an entry acts on the running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Adds `amount` to the running balance
    Contribution,
    /// Subtracts `amount` from the running balance
    Withdrawal,
    /// Resets the running balance to `amount`, ignoring prior history
    Correction,
}

/// One timestamped transaction within a goal's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique within the owning goal (UUID)
    pub uid: String,
    /// Event time; entries are processed in ascending timestamp order
    pub timestamp: DateTime<Utc>,
    /// Balance effect of this entry
    pub kind: EntryKind,
    /// Monetary amount: > 0 for contribution/withdrawal, the absolute
    /// reset value for a correction
    pub amount: f64,
    /// Free-text note
    #[serde(default)]
    pub description: String,
    /// Running balance after this entry is applied (derived)
    pub accumulated: f64,
}

/// Caller-supplied fields for a new entry; uid and accumulated are assigned
/// by the core.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: EntryKind,
    pub amount: f64,
    pub description: String,
}

impl From<NewEntry> for Entry {
    fn from(new: NewEntry) -> Self {
        Entry {
            uid: Uuid::new_v4().to_string(),
            timestamp: new.timestamp,
            kind: new.kind,
            amount: new.amount,
            description: new.description,
            accumulated: 0.0,
        }
    }
}

/// Partial update for an existing entry. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: Option<EntryKind>,
    pub amount: Option<f64>,
    pub description: Option<String>,
}

// =============================================================================
// User Models
// =============================================================================

/// Persisted user document.
///
/// The derived encryption key is never stored; `verifier` only decides login
/// success, and `key_salt` feeds the KDF. The profile and net-worth fields
/// are opaque ciphertext tokens sealed under the user's derived key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    /// Unique login name (also the storage key)
    pub username: String,
    /// Independently salted one-way password hash, for login only
    pub verifier: PasswordVerifier,
    /// Per-user salt feeding key derivation (base64url, 16 bytes).
    /// Losing it makes this user's tokens permanently undecryptable.
    pub key_salt: String,
    /// Sealed free-form profile document (JSON)
    pub encrypted_profile: String,
    /// Sealed decimal string: sum of `current` over net-worth goals
    pub encrypted_net_worth: String,
}
