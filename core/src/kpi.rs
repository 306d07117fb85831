//! KPI Evaluator — stage 2 of the settlement pipeline.
//!
//! Compares each employee's won-deal count against their target for the
//! selected calendar window. Targets aggregate per month: an override row
//! for (employee, month, year) beats the employee's default monthly
//! target, and a quarter or year sums its months under that rule.

use crate::calendar::CalendarSelection;
use crate::config::FundConfig;
use crate::records::{Customer, CustomerStatus, Employee, KpiOverride};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiResult {
    pub target: u32,
    pub actual: u32,
    /// `max(0, target - actual)`. Exceeding target never earns a credit.
    pub missed_units: u32,
}

pub fn evaluate_kpi(
    employee: &Employee,
    scoped_customers: &[&Customer],
    overrides: &[KpiOverride],
    calendar: &CalendarSelection,
    config: &FundConfig,
) -> KpiResult {
    let actual = scoped_customers
        .iter()
        .filter(|c| c.creator_id == employee.id)
        .filter(|c| c.status == CustomerStatus::Won)
        .filter(|c| !c.deal_status.map_or(false, |d| d.is_suspended()))
        .filter(|c| config.source_matches(c.source.as_deref()))
        .filter(|c| calendar.contains(c.effective_date()))
        .count() as u32;

    let target = calendar
        .months()
        .iter()
        .map(|&(month, year)| monthly_target(employee, overrides, month, year))
        .sum();

    KpiResult {
        target,
        actual,
        missed_units: target.saturating_sub(actual),
    }
}

fn monthly_target(employee: &Employee, overrides: &[KpiOverride], month: u32, year: i32) -> u32 {
    overrides
        .iter()
        .find(|o| o.user_id == employee.id && o.month == month && o.year == year)
        .map(|o| o.target)
        .or(employee.kpi_monthly_target)
        .unwrap_or(0)
}
