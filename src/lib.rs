// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! Atlas Vault - Encrypted Personal-Finance Goal Ledger Core
//!
//! This crate is the invariant-bearing core of a personal finance manager:
//! everything persisted for a user is sealed under a key derived from that
//! user's password, and every goal balance is recomputed and validated
//! against its full transaction history on every mutation. The surrounding
//! application (screens, charts, exports) is a thin caller of the
//! [`session::Session`] boundary.
//!
//! ## Modules
//!
//! - `crypto` - key derivation, authenticated token encryption, password
//!   verifier
//! - `ledger` - full-rebuild balance engine, net-worth aggregate, level
//!   scoring
//! - `storage` - record store trait and filesystem implementation
//! - `session` - the authenticated per-user entry point
//!
//! ## Example
//!
//! ```rust,no_run
//! use atlas_vault::models::{EntryKind, GoalKind, NewEntry};
//! use atlas_vault::session::Session;
//! use atlas_vault::storage::{FsRecordStore, StoragePaths};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = FsRecordStore::new(StoragePaths::from_env());
//! store.initialize()?;
//!
//! Session::register(&store, "alice", "correct horse battery staple")?;
//! let session = Session::login(&store, "alice", "correct horse battery staple")?;
//!
//! let goal = session.create_goal("Reserva", GoalKind::NetWorth, 5000.0)?;
//! session.add_entry(&goal.id, NewEntry {
//!     timestamp: chrono::Utc::now(),
//!     kind: EntryKind::Contribution,
//!     amount: 250.0,
//!     description: "first deposit".into(),
//! })?;
//!
//! println!("net worth: {}", session.net_worth()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod ledger;
pub mod models;
pub mod session;
pub mod storage;
