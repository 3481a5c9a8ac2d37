// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! Level/progress scoring of the net-worth aggregate.
//!
//! Geometric schedule: level 1 starts at 100, each level doubles the
//! floor (100, 200, 400, 800, ...). Below the base value the user is at
//! level 0 with linear progress toward level 1.

/// Monetary floor of level 1.
const LEVEL_BASE_VALUE: f64 = 100.0;

/// Floor multiplier from one level to the next.
const LEVEL_GROWTH_FACTOR: f64 = 2.0;

/// Strictly-positive input floor keeping the logarithm defined.
const MIN_TOTAL: f64 = 0.1;

/// Discrete level and progress for a monetary total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelInfo {
    /// Discrete level; 0 below the base value
    pub level: u32,
    /// Monetary floor of the current level
    pub floor: f64,
    /// Amount still needed to reach the next level
    pub amount_to_next: f64,
    /// Position within the current level, in [0, 1]
    pub progress: f64,
}

/// Score a monetary total on the geometric level schedule.
///
/// Pure and side-effect free. Non-finite input is a caller bug: reject it
/// before invoking.
pub fn score(total: f64) -> LevelInfo {
    debug_assert!(total.is_finite(), "level score called with non-finite total");

    let total = total.max(MIN_TOTAL);
    if total < LEVEL_BASE_VALUE {
        return LevelInfo {
            level: 0,
            floor: 0.0,
            amount_to_next: LEVEL_BASE_VALUE - total,
            progress: total / LEVEL_BASE_VALUE,
        };
    }

    let level = (total / LEVEL_BASE_VALUE).log(LEVEL_GROWTH_FACTOR).floor() as u32 + 1;
    let floor = LEVEL_BASE_VALUE * LEVEL_GROWTH_FACTOR.powi(level as i32 - 1);
    let next = LEVEL_BASE_VALUE * LEVEL_GROWTH_FACTOR.powi(level as i32);
    let progress = ((total - floor) / (next - floor)).min(1.0);

    LevelInfo {
        level,
        floor,
        amount_to_next: next - total,
        progress,
    }
}
