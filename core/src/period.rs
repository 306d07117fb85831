//! Period Resolver — stage 1 of the settlement pipeline.
//!
//! Decides which customers, ledger entries, and employees participate in
//! one settlement run. Membership is two-tier: an explicit
//! `fund_period_id` always wins; otherwise the record's local calendar
//! date must fall inside the period's range (end date inclusive,
//! end-of-day). Passing no period means "all periods": both filters are
//! skipped entirely.

use crate::calendar::local_date;
use crate::records::{Customer, Employee, FundPeriod, LedgerEntry};
use crate::snapshot::FundSnapshot;
use crate::types::EntityId;
use std::collections::HashSet;

/// The caller's permission scope: owners see everything, a team lead sees
/// their own rows plus direct reports, an employee sees only themself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamScope {
    All,
    Team(EntityId),
    SelfOnly(EntityId),
}

impl TeamScope {
    pub fn allows(&self, employee: &Employee) -> bool {
        match self {
            Self::All => true,
            Self::Team(manager_id) => {
                employee.id == *manager_id
                    || employee.manager_id.as_deref() == Some(manager_id.as_str())
            }
            Self::SelfOnly(user_id) => employee.id == *user_id,
        }
    }

    /// Scope check by user id, for rows whose owner may not have a profile
    /// row anymore. Unknown owners stay visible only in All scope.
    fn allows_user(&self, snapshot: &FundSnapshot, user_id: &str) -> bool {
        match self {
            Self::All => true,
            _ => snapshot
                .employee(user_id)
                .map(|e| self.allows(e))
                .unwrap_or(false),
        }
    }
}

/// The records in scope for one settlement run.
#[derive(Debug, Clone)]
pub struct Membership<'a> {
    pub customers: Vec<&'a Customer>,
    pub entries: Vec<&'a LedgerEntry>,
    pub employees: Vec<&'a Employee>,
}

pub fn resolve_membership<'a>(
    period: Option<&FundPeriod>,
    snapshot: &'a FundSnapshot,
    scope: &TeamScope,
) -> Membership<'a> {
    let customers: Vec<&Customer> = snapshot
        .customers
        .iter()
        .filter(|c| customer_in_period(c, period))
        .filter(|c| scope.allows_user(snapshot, &c.creator_id))
        .collect();

    let entries: Vec<&LedgerEntry> = snapshot
        .entries
        .iter()
        .filter(|e| entry_in_period(e, period, snapshot))
        .filter(|e| scope.allows_user(snapshot, &e.user_id))
        .collect();

    let roster: HashSet<&str> = match period {
        Some(p) => snapshot
            .fund_members
            .iter()
            .filter(|m| m.fund_id == p.id)
            .map(|m| m.user_id.as_str())
            .collect(),
        None => HashSet::new(),
    };

    let employees: Vec<&Employee> = snapshot
        .employees
        .iter()
        .filter(|e| e.is_base_eligible())
        .filter(|e| roster.is_empty() || roster.contains(e.id.as_str()))
        .filter(|e| scope.allows(e))
        .collect();

    Membership {
        customers,
        entries,
        employees,
    }
}

fn customer_in_period(customer: &Customer, period: Option<&FundPeriod>) -> bool {
    let Some(period) = period else { return true };
    match &customer.fund_period_id {
        Some(assigned) => *assigned == period.id,
        None => period.contains_date(local_date(customer.created_at)),
    }
}

fn entry_in_period(
    entry: &LedgerEntry,
    period: Option<&FundPeriod>,
    snapshot: &FundSnapshot,
) -> bool {
    let Some(period) = period else { return true };
    if let Some(assigned) = &entry.fund_period_id {
        return *assigned == period.id;
    }
    // Entries follow their customer's create date so a deal's cash lands
    // in the same period as the deal itself.
    let anchor = entry
        .customer_id
        .as_deref()
        .and_then(|id| snapshot.customer(id))
        .map(|c| c.created_at)
        .unwrap_or(entry.created_at);
    period.contains_date(local_date(anchor))
}
