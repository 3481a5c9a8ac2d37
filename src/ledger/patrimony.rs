// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! Net-worth aggregate over a user's goals.
//!
//! The aggregate is a materialized view: it is recomputed from its source
//! goals and re-persisted after every goal create, update, or delete, and
//! must never be allowed to drift from them.

use crate::models::{Goal, GoalKind};

/// Sum the current balance of every net-worth goal.
///
/// Pure and total: a user with no net-worth goals aggregates to 0.
pub fn aggregate_net_worth(goals: &[Goal]) -> f64 {
    goals
        .iter()
        .filter(|goal| goal.kind == GoalKind::NetWorth)
        .map(|goal| goal.current)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(kind: GoalKind, current: f64) -> Goal {
        let mut goal = Goal::new("g", kind, 0.0);
        goal.current = current;
        goal
    }

    #[test]
    fn no_goals_aggregates_to_zero() {
        assert_eq!(aggregate_net_worth(&[]), 0.0);
    }

    #[test]
    fn only_net_worth_goals_count() {
        let goals = vec![
            goal(GoalKind::NetWorth, 1000.0),
            goal(GoalKind::PeriodicContribution, 400.0),
            goal(GoalKind::NetWorth, 250.5),
        ];
        assert_eq!(aggregate_net_worth(&goals), 1250.5);
    }

    #[test]
    fn only_periodic_goals_aggregates_to_zero() {
        let goals = vec![
            goal(GoalKind::PeriodicContribution, 400.0),
            goal(GoalKind::PeriodicContribution, 100.0),
        ];
        assert_eq!(aggregate_net_worth(&goals), 0.0);
    }

    #[test]
    fn aggregate_matches_independent_sum() {
        let goals = vec![
            goal(GoalKind::NetWorth, 10.0),
            goal(GoalKind::NetWorth, 20.0),
            goal(GoalKind::PeriodicContribution, 99.0),
            goal(GoalKind::NetWorth, 30.0),
        ];
        let by_hand: f64 = goals
            .iter()
            .filter(|g| g.kind == GoalKind::NetWorth)
            .map(|g| g.current)
            .sum();
        assert_eq!(aggregate_net_worth(&goals), by_hand);
    }
}
