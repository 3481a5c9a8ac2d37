// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! Full-history rebuild of a goal's running balance.
//!
//! ## Algorithm
//!
//! 1. Stable-sort entries by timestamp ascending (insertion order is
//!    irrelevant; ties keep their relative order)
//! 2. Fold left with running total `r = 0`:
//!    contribution `r += amount`, withdrawal `r -= amount`,
//!    correction `r = amount` (absolute reset, not a delta)
//! 3. Record `r` as each entry's `accumulated` value
//! 4. Reject the whole rebuild if `r` ever goes negative
//!
//! The input slice is never mutated. On failure the caller's goal is
//! bitwise untouched and the prior persisted state stays authoritative.

use crate::models::{Entry, EntryKind};

/// Tolerance for floating-point dust when checking the no-negative
/// invariant. A sequence like `0.3 - 0.1 - 0.2` folds to an ulp below
/// zero; that is not a withdrawal the user never funded.
const BALANCE_EPSILON: f64 = 1e-9;

/// A mutation would leave the running balance negative at some point in
/// the timeline. The whole rebuild is rejected; nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entry {entry_uid} would make the running balance negative")]
pub struct InvariantViolation {
    /// The first entry at which the folded balance went negative.
    pub entry_uid: String,
}

/// Successful rebuild output.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebuilt {
    /// Entries in chronological order with `accumulated` assigned.
    pub entries: Vec<Entry>,
    /// Running balance after the last entry; 0 for an empty history.
    pub current: f64,
}

/// Recompute a goal's ordered history and current balance from scratch.
pub fn rebuild(entries: &[Entry]) -> Result<Rebuilt, InvariantViolation> {
    let mut ordered: Vec<Entry> = entries.to_vec();
    ordered.sort_by_key(|entry| entry.timestamp);

    let mut current = 0.0_f64;
    for entry in &mut ordered {
        match entry.kind {
            EntryKind::Contribution => current += entry.amount,
            EntryKind::Withdrawal => current -= entry.amount,
            EntryKind::Correction => current = entry.amount,
        }
        if current < -BALANCE_EPSILON {
            return Err(InvariantViolation {
                entry_uid: entry.uid.clone(),
            });
        }
        entry.accumulated = current;
    }

    Ok(Rebuilt {
        entries: ordered,
        current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn entry(uid: &str, secs: i64, kind: EntryKind, amount: f64) -> Entry {
        Entry {
            uid: uid.into(),
            timestamp: at(secs),
            kind,
            amount,
            description: String::new(),
            accumulated: 0.0,
        }
    }

    #[test]
    fn empty_history_rebuilds_to_zero() {
        let rebuilt = rebuild(&[]).unwrap();
        assert!(rebuilt.entries.is_empty());
        assert_eq!(rebuilt.current, 0.0);
    }

    #[test]
    fn out_of_order_entries_are_reordered_before_folding() {
        // Inserted newest-first; rebuild must process t=1 before t=2.
        let entries = vec![
            entry("b", 2, EntryKind::Contribution, 100.0),
            entry("a", 1, EntryKind::Contribution, 50.0),
        ];
        let rebuilt = rebuild(&entries).unwrap();

        assert_eq!(rebuilt.entries[0].uid, "a");
        assert_eq!(rebuilt.entries[0].accumulated, 50.0);
        assert_eq!(rebuilt.entries[1].uid, "b");
        assert_eq!(rebuilt.entries[1].accumulated, 150.0);
        assert_eq!(rebuilt.current, 150.0);
    }

    #[test]
    fn overdraw_fails_with_offending_uid() {
        let entries = vec![
            entry("dep", 1, EntryKind::Contribution, 100.0),
            entry("wd", 2, EntryKind::Withdrawal, 150.0),
        ];
        let violation = rebuild(&entries).unwrap_err();
        assert_eq!(violation.entry_uid, "wd");
    }

    #[test]
    fn failed_rebuild_leaves_input_untouched() {
        let entries = vec![
            entry("dep", 1, EntryKind::Contribution, 100.0),
            entry("wd", 2, EntryKind::Withdrawal, 150.0),
        ];
        let before = entries.clone();
        assert!(rebuild(&entries).is_err());
        assert_eq!(entries, before);
    }

    #[test]
    fn correction_resets_regardless_of_prior_balance() {
        let entries = vec![
            entry("dep", 1, EntryKind::Contribution, 500.0),
            entry("fix", 2, EntryKind::Correction, 80.0),
            entry("wd", 3, EntryKind::Withdrawal, 30.0),
        ];
        let rebuilt = rebuild(&entries).unwrap();
        assert_eq!(rebuilt.entries[1].accumulated, 80.0);
        assert_eq!(rebuilt.current, 50.0);
    }

    #[test]
    fn consecutive_corrections_are_legal() {
        let entries = vec![
            entry("fix1", 1, EntryKind::Correction, 300.0),
            entry("fix2", 2, EntryKind::Correction, 120.0),
        ];
        let rebuilt = rebuild(&entries).unwrap();
        assert_eq!(rebuilt.entries[0].accumulated, 300.0);
        assert_eq!(rebuilt.entries[1].accumulated, 120.0);
        assert_eq!(rebuilt.current, 120.0);
    }

    #[test]
    fn backdated_correction_only_affects_from_its_position_forward() {
        let entries = vec![
            entry("dep", 2, EntryKind::Contribution, 40.0),
            entry("fix", 1, EntryKind::Correction, 100.0),
        ];
        let rebuilt = rebuild(&entries).unwrap();
        // Correction sorts first, later contribution applies on top of it.
        assert_eq!(rebuilt.entries[0].uid, "fix");
        assert_eq!(rebuilt.entries[0].accumulated, 100.0);
        assert_eq!(rebuilt.entries[1].accumulated, 140.0);
    }

    #[test]
    fn backdated_contribution_reflows_all_later_accumulated_values() {
        let mut entries = vec![
            entry("dep", 10, EntryKind::Contribution, 100.0),
            entry("wd", 20, EntryKind::Withdrawal, 60.0),
        ];
        let first = rebuild(&entries).unwrap();
        assert_eq!(first.current, 40.0);

        // Backdate a deposit before everything else.
        entries.push(entry("old", 5, EntryKind::Contribution, 25.0));
        let rebuilt = rebuild(&entries).unwrap();

        let accumulated: Vec<f64> =
            rebuilt.entries.iter().map(|e| e.accumulated).collect();
        assert_eq!(accumulated, vec![25.0, 125.0, 65.0]);
        assert_eq!(rebuilt.current, 65.0);
    }

    #[test]
    fn editing_amount_downward_past_a_withdrawal_fails() {
        let mut entries = vec![
            entry("dep", 1, EntryKind::Contribution, 200.0),
            entry("wd", 2, EntryKind::Withdrawal, 150.0),
        ];
        assert!(rebuild(&entries).is_ok());

        // Shrinking the deposit makes the existing withdrawal impossible;
        // the rebuild must fail, not silently clamp.
        entries[0].amount = 100.0;
        let violation = rebuild(&entries).unwrap_err();
        assert_eq!(violation.entry_uid, "wd");
    }

    #[test]
    fn rebuild_is_idempotent_on_its_own_output() {
        let entries = vec![
            entry("c", 3, EntryKind::Withdrawal, 10.0),
            entry("a", 1, EntryKind::Contribution, 100.0),
            entry("b", 2, EntryKind::Correction, 70.0),
        ];
        let once = rebuild(&entries).unwrap();
        let twice = rebuild(&once.entries).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn ties_on_timestamp_keep_insertion_order() {
        let entries = vec![
            entry("first", 1, EntryKind::Contribution, 10.0),
            entry("second", 1, EntryKind::Contribution, 20.0),
        ];
        let rebuilt = rebuild(&entries).unwrap();
        assert_eq!(rebuilt.entries[0].uid, "first");
        assert_eq!(rebuilt.entries[1].uid, "second");
        assert_eq!(rebuilt.current, 30.0);
    }

    #[test]
    fn every_prefix_balance_is_non_negative_on_success() {
        let entries = vec![
            entry("a", 1, EntryKind::Contribution, 50.0),
            entry("b", 2, EntryKind::Withdrawal, 50.0),
            entry("c", 3, EntryKind::Contribution, 10.0),
            entry("d", 4, EntryKind::Withdrawal, 10.0),
        ];
        let rebuilt = rebuild(&entries).unwrap();
        for e in &rebuilt.entries {
            assert!(e.accumulated >= 0.0, "prefix went negative at {}", e.uid);
        }
        assert_eq!(rebuilt.current, 0.0);
    }

    #[test]
    fn float_dust_is_not_treated_as_an_overdraw() {
        let entries = vec![
            entry("dep", 1, EntryKind::Contribution, 0.3),
            entry("w1", 2, EntryKind::Withdrawal, 0.1),
            entry("w2", 3, EntryKind::Withdrawal, 0.2),
        ];
        // 0.3 - 0.1 - 0.2 folds to an ulp below zero in f64.
        assert!(rebuild(&entries).is_ok());
    }
}
