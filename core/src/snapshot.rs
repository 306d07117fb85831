//! The read snapshot the engine computes over.
//!
//! All seven record sets are fetched inside a single transaction
//! (`FundStore::load_snapshot`) so the settlement pipeline sees one
//! consistent state. The engine never re-reads mid-computation; concurrent
//! writers make rows advisory until a payout is explicitly committed.

use crate::records::{
    Customer, Employee, FundMember, FundPeriod, KpiOverride, LedgerEntry, ProfitExclusion,
};

#[derive(Debug, Clone, Default)]
pub struct FundSnapshot {
    pub employees: Vec<Employee>,
    pub customers: Vec<Customer>,
    pub entries: Vec<LedgerEntry>,
    pub periods: Vec<FundPeriod>,
    pub fund_members: Vec<FundMember>,
    pub exclusions: Vec<ProfitExclusion>,
    pub kpi_overrides: Vec<KpiOverride>,
}

impl FundSnapshot {
    pub fn period(&self, id: &str) -> Option<&FundPeriod> {
        self.periods.iter().find(|p| p.id == id)
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }
}
