// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! # Ledger Consistency Engine
//!
//! A goal's balance is never patched incrementally. Every mutation triggers
//! a full rebuild from the complete entry history, which is what makes
//! edits and out-of-order backdated entries safe: any single change
//! anywhere in the timeline is validated against the *entire* resulting
//! timeline, not just the tail. Do not "optimize" this into an incremental
//! counter - that reintroduces the drift bugs the rebuild exists to
//! prevent.
//!
//! All functions here are pure and reentrant; they touch no storage and may
//! run on any thread.
//!
//! - [`engine`] - chronological fold with the no-negative-balance invariant
//! - [`patrimony`] - net-worth aggregate over a user's goals
//! - [`level`] - geometric level/progress scoring of the aggregate

pub mod engine;
pub mod level;
pub mod patrimony;

pub use engine::{rebuild, InvariantViolation, Rebuilt};
pub use level::{score, LevelInfo};
pub use patrimony::aggregate_net_worth;
