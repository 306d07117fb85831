//! Share Allocator — stage 3 of the settlement pipeline.
//!
//! PASS ORDER (fixed, documented, never reordered):
//!   1. Exclusion redistribution
//!   2. KPI penalty redistribution
//!   3. Bonus cost-sharing
//!
//! RULES:
//!   - Every row starts at the equal split: pool/N and 100/N.
//!   - Each pass mutates the running `share` left by the previous pass,
//!     so redistribution effects compound.
//!   - Exclusion and penalty amounts are computed against the immutable
//!     pre-pass equal share (`base_share`), never the running share.
//!     Switching to the cumulative share changes every downstream number.

use crate::config::FundConfig;
use crate::kpi::KpiResult;
use crate::records::Employee;
use crate::types::{EntityId, Money, Ratio};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRow {
    pub user_id: EntityId,
    pub full_name: String,
    /// pool / N. Never mutated after initialization.
    pub base_share: Money,
    /// 100 / N, in percent points.
    pub base_ratio: Ratio,
    /// base_ratio scaled down by the KPI penalty percent.
    pub final_ratio: Ratio,
    /// Profit removed from this employee by exclusion rules.
    pub excluded_profit: Money,
    /// Income gained from other employees' exclusions and penalties.
    /// Display only — already folded into `share`, never re-deducted.
    pub redistributed_income: Money,
    /// KPI penalty deducted from this employee.
    pub penalty: Money,
    /// This employee's slice of the team-wide bonus cost.
    pub bonus_cost_share: Money,
    /// This employee's own personal bonus, paid for by the team.
    pub personal_bonus: Money,
    /// The running adjusted share; input to net settlement.
    pub share: Money,
    pub kpi: KpiResult,
}

/// Divide the distributable pool among eligible employees.
///
/// `excluded_profit` maps employee id to the approved deposit total of
/// their excluded customers; `personal_bonuses` maps employee id to their
/// approved personal bonus total. Returns an empty vec when `eligible` is
/// empty — nothing to distribute is not an error.
pub fn allocate_shares(
    eligible: &[&Employee],
    pool: Money,
    kpi_results: &HashMap<EntityId, KpiResult>,
    excluded_profit: &HashMap<EntityId, Money>,
    personal_bonuses: &HashMap<EntityId, Money>,
    config: &FundConfig,
) -> Vec<ShareRow> {
    let n = eligible.len();
    if n == 0 {
        return Vec::new();
    }

    let base_share = pool / n as f64;
    let base_ratio = 100.0 / n as f64;

    let mut rows: Vec<ShareRow> = eligible
        .iter()
        .map(|e| ShareRow {
            user_id: e.id.clone(),
            full_name: e.full_name.clone(),
            base_share,
            base_ratio,
            final_ratio: base_ratio,
            excluded_profit: 0.0,
            redistributed_income: 0.0,
            penalty: 0.0,
            bonus_cost_share: 0.0,
            personal_bonus: 0.0,
            share: base_share,
            kpi: kpi_results
                .get(&e.id)
                .copied()
                .unwrap_or(KpiResult { target: 0, actual: 0, missed_units: 0 }),
        })
        .collect();

    exclusion_pass(&mut rows, excluded_profit);
    penalty_pass(&mut rows, config);
    bonus_pass(&mut rows, personal_bonuses);

    rows
}

/// Pass 1: an excluded customer's profit leaves its employee's personal
/// slice (1/N of it) and is split evenly among the other N-1 employees.
/// With a single eligible employee the amount is simply removed.
fn exclusion_pass(rows: &mut [ShareRow], excluded_profit: &HashMap<EntityId, Money>) {
    let n = rows.len();
    let deductions: Vec<(usize, Money)> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            excluded_profit
                .get(&r.user_id)
                .filter(|&&p| p > 0.0)
                .map(|&p| (i, p))
        })
        .collect();

    for (idx, profit) in deductions {
        let removed = profit / n as f64;
        rows[idx].excluded_profit += profit;
        rows[idx].share -= removed;

        if n > 1 {
            let gain = removed / (n - 1) as f64;
            for (j, row) in rows.iter_mut().enumerate() {
                if j != idx {
                    row.share += gain;
                    row.redistributed_income += gain;
                }
            }
        }
    }
}

/// Pass 2: each missed KPI unit costs `base_share × rate`. The penalty is
/// split evenly among employees who fully met their target; when nobody
/// did, the amount leaves the shareable pool entirely (original behavior,
/// kept deliberately — see DESIGN.md).
fn penalty_pass(rows: &mut [ShareRow], config: &FundConfig) {
    let meeters: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.kpi.missed_units == 0)
        .map(|(i, _)| i)
        .collect();

    let penalties: Vec<(usize, Money, Ratio)> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.kpi.missed_units > 0)
        .map(|(i, r)| {
            let percent = r.kpi.missed_units as f64 * config.penalty_rate_for(&r.user_id);
            (i, r.base_share * percent, percent)
        })
        .collect();

    for (idx, penalty, percent) in penalties {
        rows[idx].penalty += penalty;
        rows[idx].share -= penalty;
        rows[idx].final_ratio = rows[idx].base_ratio * (1.0 - percent);

        if !meeters.is_empty() {
            let gain = penalty / meeters.len() as f64;
            for &j in &meeters {
                rows[j].share += gain;
                rows[j].redistributed_income += gain;
            }
        }
    }
}

/// Pass 3: personal bonuses are paid for collectively. Every row carries
/// an equal slice of the total cost; bonus owners then get their own
/// bonus back in full.
fn bonus_pass(rows: &mut [ShareRow], personal_bonuses: &HashMap<EntityId, Money>) {
    let n = rows.len() as f64;
    let total: Money = rows
        .iter()
        .map(|r| personal_bonuses.get(&r.user_id).copied().unwrap_or(0.0))
        .sum();
    if total == 0.0 {
        return;
    }

    let cost_each = total / n;
    for row in rows.iter_mut() {
        row.bonus_cost_share = cost_each;
        row.share -= cost_each;
        if let Some(&bonus) = personal_bonuses.get(&row.user_id) {
            if bonus > 0.0 {
                row.personal_bonus = bonus;
                row.share += bonus;
            }
        }
    }
}
