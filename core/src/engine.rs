//! The settlement engine — the heart of dealdesk.
//!
//! PIPELINE ORDER (fixed, documented, never reordered):
//!   1. Period Resolver    (period.rs)
//!   2. KPI Evaluator      (kpi.rs)
//!   3. Share Allocator    (allocator.rs)
//!   4. Net Settlement     (settlement.rs)
//!
//! RULES:
//!   - `compute` is pure: it reads only the snapshot, performs no I/O,
//!     and is idempotent — the same snapshot always yields the same rows.
//!   - Writes (payouts) go through `record_payouts`, a separate command
//!     with at-least-once semantics. Rows are advisory until committed.

use crate::allocator::allocate_shares;
use crate::calendar::CalendarSelection;
use crate::config::FundConfig;
use crate::error::{FundError, FundResult};
use crate::event::{event_type_name, EventBus, FundEvent};
use crate::kpi::{evaluate_kpi, KpiResult};
use crate::period::{resolve_membership, Membership, TeamScope};
use crate::pool::distributable_pool;
use crate::records::EntryKind;
use crate::settlement::{settle, SettlementRow};
use crate::snapshot::FundSnapshot;
use crate::store::FundStore;
use crate::types::{EntityId, Money};
use std::collections::HashMap;

/// Caller-supplied filter selections for one settlement run. Plain
/// parameters; the engine owns no persisted state.
#[derive(Debug, Clone)]
pub struct PeriodFilter {
    /// None = "all periods": record filters are skipped entirely.
    pub period_id: Option<EntityId>,
    pub calendar: CalendarSelection,
    pub scope: TeamScope,
}

pub struct SettlementEngine {
    config: FundConfig,
}

impl SettlementEngine {
    pub fn new(config: FundConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FundConfig {
        &self.config
    }

    /// Run the full pipeline over one snapshot.
    ///
    /// Returns one row per eligible employee, sorted by user id so equal
    /// snapshots produce identical output. An empty employee set yields an
    /// empty vec — nothing to distribute, not an error.
    pub fn compute(
        &self,
        snapshot: &FundSnapshot,
        filter: &PeriodFilter,
    ) -> FundResult<Vec<SettlementRow>> {
        let period = match &filter.period_id {
            Some(id) => Some(
                snapshot
                    .period(id)
                    .ok_or_else(|| FundError::PeriodNotFound(id.clone()))?,
            ),
            None => None,
        };

        let membership = resolve_membership(period, snapshot, &filter.scope);
        if membership.employees.is_empty() {
            return Ok(Vec::new());
        }

        let pool = distributable_pool(&membership.entries, &self.config);

        let kpi_results: HashMap<EntityId, KpiResult> = membership
            .employees
            .iter()
            .map(|e| {
                let kpi = evaluate_kpi(
                    e,
                    &membership.customers,
                    &snapshot.kpi_overrides,
                    &filter.calendar,
                    &self.config,
                );
                (e.id.clone(), kpi)
            })
            .collect();

        let excluded_profit = self.excluded_profit_by_user(snapshot, &membership);
        let personal_bonuses = personal_bonuses_by_user(&membership);

        let mut rows: Vec<SettlementRow> = allocate_shares(
            &membership.employees,
            pool,
            &kpi_results,
            &excluded_profit,
            &personal_bonuses,
            &self.config,
        )
        .into_iter()
        .map(|allocation| settle(allocation, &membership.entries, &self.config))
        .collect();

        rows.sort_by(|a, b| a.allocation.user_id.cmp(&b.allocation.user_id));
        Ok(rows)
    }

    /// Approved deposit total of each employee's excluded customers,
    /// restricted to customers and entries actually in scope.
    fn excluded_profit_by_user(
        &self,
        snapshot: &FundSnapshot,
        membership: &Membership<'_>,
    ) -> HashMap<EntityId, Money> {
        let scoped_customer_ids: std::collections::HashSet<&str> =
            membership.customers.iter().map(|c| c.id.as_str()).collect();

        let mut by_user: HashMap<EntityId, Money> = HashMap::new();
        for exclusion in &snapshot.exclusions {
            if !scoped_customer_ids.contains(exclusion.customer_id.as_str()) {
                continue;
            }
            let profit: Money = membership
                .entries
                .iter()
                .filter(|e| e.is_approved() && e.kind == EntryKind::Deposit)
                .filter(|e| e.customer_id.as_deref() == Some(exclusion.customer_id.as_str()))
                .map(|e| e.amount)
                .sum();
            if profit > 0.0 {
                *by_user.entry(exclusion.user_id.clone()).or_default() += profit;
            }
        }
        by_user
    }

    /// Write payout entries for every row with a positive net payable.
    ///
    /// This is the only stateful, order-sensitive operation around the
    /// engine. Callers should re-fetch a snapshot before committing when
    /// other actors may have approved entries in the meantime.
    pub fn record_payouts(
        &self,
        store: &FundStore,
        rows: &[SettlementRow],
        period_id: Option<&str>,
        bus: Option<&EventBus>,
    ) -> FundResult<usize> {
        let mut written = 0;
        for row in rows {
            if row.net_payable <= 0.0 {
                continue;
            }
            let reason = format!(
                "Salary payout {} {}",
                row.allocation.full_name, self.config.salary_payout_tag
            );
            let entry_id =
                store.record_payout(&row.allocation.user_id, row.net_payable, period_id, &reason)?;

            let event = FundEvent::PayoutRecorded {
                entry_id: entry_id.clone(),
                user_id: row.allocation.user_id.clone(),
                amount: row.net_payable,
                period_id: period_id.map(str::to_string),
            };
            store.append_event(period_id, event_type_name(&event), &serde_json::to_string(&event)?)?;
            if let Some(bus) = bus {
                bus.publish(&event);
            }
            log::info!(
                "payout: {} -> {:.0} ({})",
                row.allocation.full_name,
                row.net_payable,
                entry_id
            );
            written += 1;
        }
        Ok(written)
    }
}

fn personal_bonuses_by_user(membership: &Membership<'_>) -> HashMap<EntityId, Money> {
    let mut by_user: HashMap<EntityId, Money> = HashMap::new();
    for entry in &membership.entries {
        if entry.is_approved() && entry.kind == EntryKind::PersonalBonus {
            *by_user.entry(entry.user_id.clone()).or_default() += entry.amount;
        }
    }
    by_user
}
