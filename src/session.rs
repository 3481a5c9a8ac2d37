// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! # Session Boundary
//!
//! The session object is the single entry point the surrounding UI calls
//! into. It holds the derived key for exactly one authenticated user - no
//! ambient globals - and every goal mutation flows through it:
//!
//! ```text
//! mutation -> ledger rebuild/validate -> seal goal -> persist
//!          -> recompute net-worth aggregate -> seal -> persist
//! ```
//!
//! ## Failure Model
//!
//! - [`SessionError::AuthFailure`] covers both "unknown username" and
//!   "wrong password" without distinguishing them (no username
//!   enumeration)
//! - A goal record that fails to decrypt during listing is skipped with a
//!   warning, never a crash; the profile and aggregate fall back to
//!   documented defaults (empty object, 0.0)
//! - A rejected ledger mutation persists nothing: the prior stored goal
//!   remains authoritative
//!
//! The derived key lives only inside the session and is zeroized when the
//! session is dropped (logout).

use std::str::FromStr;

use base64ct::{Base64UrlUnpadded, Encoding};
use tracing::{debug, warn};

use crate::crypto::securebox::{open, seal, DecryptError};
use crate::crypto::verifier::PasswordVerifier;
use crate::crypto::{derive_key, generate_salt, DerivedKey};
use crate::ledger::engine::{rebuild, InvariantViolation};
use crate::ledger::level::{score, LevelInfo};
use crate::ledger::patrimony::aggregate_net_worth;
use crate::models::{Entry, EntryKind, EntryPatch, Goal, GoalKind, NewEntry, StoredUser};
use crate::storage::{RecordKind, RecordStore, StorageError};

/// Name of the protected net-worth goal created at registration.
const DEFAULT_GOAL_NAME: &str = "Patrimônio Total";

/// Initial target of the default goal.
const DEFAULT_GOAL_TARGET: f64 = 10_000.0;

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Wrong credentials. Deliberately cause-free: unknown username and
    /// wrong password look identical to the caller.
    #[error("authentication failed")]
    AuthFailure,

    /// A specifically requested record could not be opened under the
    /// session key.
    #[error(transparent)]
    Decrypt(#[from] DecryptError),

    /// A mutation would make a running balance negative; nothing was
    /// persisted.
    #[error(transparent)]
    Ledger(#[from] InvariantViolation),

    /// Record store failure; fatal to the operation, not retried.
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("goal not found: {0}")]
    GoalNotFound(String),

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// The system-created default goal resists deletion.
    #[error("the default goal cannot be deleted")]
    DefaultGoalProtected,

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// An authenticated single-user session over a record store.
pub struct Session<'a, S: RecordStore> {
    store: &'a S,
    username: String,
    key: DerivedKey,
}

impl<'a, S: RecordStore> Session<'a, S> {
    // ========== Account Lifecycle ==========

    /// Register a new user.
    ///
    /// Creates the password verifier, a fresh per-user key salt, a sealed
    /// empty profile, a sealed zero net-worth aggregate, and the protected
    /// default net-worth goal. The caller still logs in afterwards; the
    /// derived key is not retained here.
    pub fn register(store: &S, username: &str, password: &str) -> SessionResult<()> {
        if username.trim().is_empty() {
            return Err(SessionError::InvalidInput("username must not be empty"));
        }
        if password.is_empty() {
            return Err(SessionError::InvalidInput("password must not be empty"));
        }

        let salt = generate_salt();
        let key = derive_key(password, &salt);

        let user = StoredUser {
            username: username.to_string(),
            verifier: PasswordVerifier::new(password),
            key_salt: Base64UrlUnpadded::encode_string(&salt),
            encrypted_profile: seal(&key, "{}"),
            encrypted_net_worth: seal(&key, "0"),
        };
        store.create_user(&user)?;

        // System goal every account starts with; resists deletion.
        let mut default_goal = Goal::new(DEFAULT_GOAL_NAME, GoalKind::NetWorth, DEFAULT_GOAL_TARGET);
        default_goal.is_default = true;

        let token = seal(&key, &serde_json::to_string(&default_goal).map_err(StorageError::from)?);
        store.put_record(username, RecordKind::Goal, &default_goal.id, &token)?;

        debug!(username, "registered new user");
        Ok(())
    }

    /// Authenticate and open a session.
    ///
    /// The KDF runs exactly once here (deliberately slow, hundreds of
    /// milliseconds); callers must not re-invoke login per operation.
    pub fn login(store: &'a S, username: &str, password: &str) -> SessionResult<Self> {
        let Some(user) = store.get_user(username)? else {
            return Err(SessionError::AuthFailure);
        };
        if !user.verifier.verify(password) {
            return Err(SessionError::AuthFailure);
        }

        let Ok(salt) = Base64UrlUnpadded::decode_vec(&user.key_salt) else {
            // Unreadable salt means this account's key space is gone;
            // surface it no differently than bad credentials.
            warn!(username, "stored key salt is undecodable");
            return Err(SessionError::AuthFailure);
        };

        Ok(Self {
            store,
            username: username.to_string(),
            key: derive_key(password, &salt),
        })
    }

    /// The authenticated username.
    pub fn username(&self) -> &str {
        &self.username
    }

    // ========== Goals ==========

    /// List all readable goals for this user.
    ///
    /// Records that fail to decrypt or parse are skipped with a warning:
    /// a corrupt record must never take the whole account down.
    pub fn goals(&self) -> SessionResult<Vec<Goal>> {
        let ids = self.store.list_record_ids(&self.username, RecordKind::Goal)?;

        let mut goals = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(token) = self.store.get_record(&self.username, RecordKind::Goal, &id)? else {
                continue;
            };
            match open(&self.key, &token).map(|json| serde_json::from_str::<Goal>(&json)) {
                Ok(Ok(goal)) => goals.push(goal),
                Ok(Err(e)) => warn!(%id, error = %e, "skipping unparsable goal record"),
                Err(_) => warn!(%id, "skipping undecryptable goal record"),
            }
        }
        Ok(goals)
    }

    /// Load one goal by id.
    pub fn goal(&self, goal_id: &str) -> SessionResult<Goal> {
        let token = self
            .store
            .get_record(&self.username, RecordKind::Goal, goal_id)?
            .ok_or_else(|| SessionError::GoalNotFound(goal_id.to_string()))?;

        let json = open(&self.key, &token)?;
        let goal = serde_json::from_str(&json).map_err(StorageError::from)?;
        Ok(goal)
    }

    /// Create a new empty goal and resync the aggregate.
    pub fn create_goal(
        &self,
        name: &str,
        kind: GoalKind,
        target: f64,
    ) -> SessionResult<Goal> {
        if name.trim().is_empty() {
            return Err(SessionError::InvalidInput("goal name must not be empty"));
        }
        if !target.is_finite() || target < 0.0 {
            return Err(SessionError::InvalidInput("goal target must be >= 0"));
        }

        let goal = Goal::new(name, kind, target);
        self.persist_goal(&goal)?;
        self.sync_net_worth()?;
        Ok(goal)
    }

    /// Update a goal's name and target (metadata only; balances are
    /// untouched).
    pub fn update_goal(&self, goal_id: &str, name: &str, target: f64) -> SessionResult<Goal> {
        if name.trim().is_empty() {
            return Err(SessionError::InvalidInput("goal name must not be empty"));
        }
        if !target.is_finite() || target < 0.0 {
            return Err(SessionError::InvalidInput("goal target must be >= 0"));
        }

        let mut goal = self.goal(goal_id)?;
        goal.name = name.to_string();
        goal.target = target;
        self.persist_goal(&goal)?;
        self.sync_net_worth()?;
        Ok(goal)
    }

    /// Delete a goal and resync the aggregate.
    ///
    /// The system-created default goal is refused.
    pub fn delete_goal(&self, goal_id: &str) -> SessionResult<()> {
        let goal = self.goal(goal_id)?;
        if goal.is_default {
            return Err(SessionError::DefaultGoalProtected);
        }

        self.store
            .delete_record(&self.username, RecordKind::Goal, goal_id)?;
        self.sync_net_worth()?;
        Ok(())
    }

    // ========== Entries ==========

    /// Append a transaction to a goal's history.
    ///
    /// The whole history is rebuilt and validated first; on an invariant
    /// violation nothing is persisted and the stored goal is unchanged.
    pub fn add_entry(&self, goal_id: &str, new: NewEntry) -> SessionResult<Goal> {
        validate_amount(new.kind, new.amount)?;

        let mut goal = self.goal(goal_id)?;
        goal.history.push(new.into());
        self.rebuild_and_persist(goal)
    }

    /// Edit an existing entry, identified by uid.
    pub fn edit_entry(
        &self,
        goal_id: &str,
        entry_uid: &str,
        patch: EntryPatch,
    ) -> SessionResult<Goal> {
        let mut goal = self.goal(goal_id)?;
        let entry = goal
            .history
            .iter_mut()
            .find(|entry| entry.uid == entry_uid)
            .ok_or_else(|| SessionError::EntryNotFound(entry_uid.to_string()))?;

        apply_patch(entry, patch);
        validate_amount(entry.kind, entry.amount)?;

        self.rebuild_and_persist(goal)
    }

    /// Remove an entry, identified by uid.
    pub fn remove_entry(&self, goal_id: &str, entry_uid: &str) -> SessionResult<Goal> {
        let mut goal = self.goal(goal_id)?;
        let before = goal.history.len();
        goal.history.retain(|entry| entry.uid != entry_uid);
        if goal.history.len() == before {
            return Err(SessionError::EntryNotFound(entry_uid.to_string()));
        }

        self.rebuild_and_persist(goal)
    }

    // ========== Aggregate & Level ==========

    /// The persisted net-worth aggregate.
    ///
    /// Falls back to 0.0 when the stored token cannot be opened or parsed;
    /// the next goal mutation re-materializes it.
    pub fn net_worth(&self) -> SessionResult<f64> {
        let Some(user) = self.store.get_user(&self.username)? else {
            warn!(username = %self.username, "user record vanished; net worth defaults to 0");
            return Ok(0.0);
        };

        match open(&self.key, &user.encrypted_net_worth) {
            Ok(plain) => Ok(f64::from_str(&plain).unwrap_or_else(|_| {
                warn!(username = %self.username, "net worth token held no number; defaulting to 0");
                0.0
            })),
            Err(_) => {
                warn!(username = %self.username, "net worth token undecryptable; defaulting to 0");
                Ok(0.0)
            }
        }
    }

    /// Level and progress for the current net-worth aggregate.
    pub fn level(&self) -> SessionResult<LevelInfo> {
        Ok(score(self.net_worth()?))
    }

    // ========== Profile ==========

    /// The user's free-form settings document.
    ///
    /// Opaque to the core; falls back to an empty object when the stored
    /// token cannot be opened or parsed.
    pub fn profile(&self) -> SessionResult<serde_json::Value> {
        let Some(user) = self.store.get_user(&self.username)? else {
            return Ok(serde_json::Value::Object(Default::default()));
        };

        match open(&self.key, &user.encrypted_profile) {
            Ok(plain) => Ok(serde_json::from_str(&plain).unwrap_or_else(|_| {
                warn!(username = %self.username, "profile token held invalid JSON; defaulting");
                serde_json::Value::Object(Default::default())
            })),
            Err(_) => {
                warn!(username = %self.username, "profile token undecryptable; defaulting");
                Ok(serde_json::Value::Object(Default::default()))
            }
        }
    }

    /// Seal and persist the settings document.
    pub fn save_profile(&self, profile: &serde_json::Value) -> SessionResult<()> {
        let mut user = self.load_user()?;
        let json = serde_json::to_string(profile).map_err(StorageError::from)?;
        user.encrypted_profile = seal(&self.key, &json);
        self.store.put_user(&user)?;
        Ok(())
    }

    // ========== Internals ==========

    fn load_user(&self) -> SessionResult<StoredUser> {
        self.store
            .get_user(&self.username)?
            .ok_or(SessionError::AuthFailure)
    }

    /// Rebuild a goal's history, persist it, and resync the aggregate.
    /// The invariant check happens before any write.
    fn rebuild_and_persist(&self, mut goal: Goal) -> SessionResult<Goal> {
        let rebuilt = rebuild(&goal.history)?;
        goal.history = rebuilt.entries;
        goal.current = rebuilt.current;

        self.persist_goal(&goal)?;
        self.sync_net_worth()?;
        Ok(goal)
    }

    fn persist_goal(&self, goal: &Goal) -> SessionResult<()> {
        let json = serde_json::to_string(goal).map_err(StorageError::from)?;
        let token = seal(&self.key, &json);
        self.store
            .put_record(&self.username, RecordKind::Goal, &goal.id, &token)?;
        Ok(())
    }

    /// Re-materialize the net-worth aggregate from its source goals.
    /// Invoked after every goal create, update, or delete so the persisted
    /// figure never drifts.
    fn sync_net_worth(&self) -> SessionResult<f64> {
        let goals = self.goals()?;
        let total = aggregate_net_worth(&goals);

        let mut user = self.load_user()?;
        user.encrypted_net_worth = seal(&self.key, &total.to_string());
        self.store.put_user(&user)?;

        debug!(username = %self.username, total, "net worth aggregate resynced");
        Ok(total)
    }
}

fn validate_amount(kind: EntryKind, amount: f64) -> SessionResult<()> {
    if !amount.is_finite() {
        return Err(SessionError::InvalidInput("amount must be finite"));
    }
    match kind {
        EntryKind::Contribution | EntryKind::Withdrawal if amount <= 0.0 => {
            Err(SessionError::InvalidInput("amount must be > 0"))
        }
        EntryKind::Correction if amount < 0.0 => {
            Err(SessionError::InvalidInput("correction value must be >= 0"))
        }
        _ => Ok(()),
    }
}

fn apply_patch(entry: &mut Entry, patch: EntryPatch) {
    if let Some(timestamp) = patch.timestamp {
        entry.timestamp = timestamp;
    }
    if let Some(kind) = patch.kind {
        entry.kind = kind;
    }
    if let Some(amount) = patch.amount {
        entry.amount = amount;
    }
    if let Some(description) = patch.description {
        entry.description = description;
    }
}
