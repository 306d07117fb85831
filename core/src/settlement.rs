//! Net Settlement Calculator — stage 4 of the settlement pipeline.
//!
//! Takes an allocated share row and nets out what the employee already
//! received: deductible salary advances and salary payouts made earlier in
//! the scope. A negative result is a valid terminal state — the employee
//! owes the company — and must be rendered as a debit, never suppressed.

use crate::allocator::ShareRow;
use crate::config::FundConfig;
use crate::records::{AdvanceSubtype, EntryKind, LedgerEntry};
use crate::types::Money;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRow {
    pub allocation: ShareRow,
    /// Approved deductible advances taken in scope.
    pub advance_deductions: Money,
    /// Salary already disbursed in scope.
    pub paid_salary: Money,
    /// adjusted share − advances − paid salary. May be negative.
    pub net_payable: Money,
}

pub fn settle(allocation: ShareRow, entries: &[&LedgerEntry], config: &FundConfig) -> SettlementRow {
    let advance_deductions = advance_deductions(&allocation.user_id, entries);
    let paid_salary = paid_salary(&allocation.user_id, entries, config);
    let net_payable = allocation.share - advance_deductions - paid_salary;

    SettlementRow {
        allocation,
        advance_deductions,
        paid_salary,
        net_payable,
    }
}

fn advance_deductions(user_id: &str, entries: &[&LedgerEntry]) -> Money {
    entries
        .iter()
        .filter(|e| e.user_id == user_id && e.is_approved())
        .filter(|e| e.kind == EntryKind::Advance && e.subtype == Some(AdvanceSubtype::Deductible))
        .map(|e| e.amount)
        .sum()
}

fn paid_salary(user_id: &str, entries: &[&LedgerEntry], config: &FundConfig) -> Money {
    entries
        .iter()
        .filter(|e| e.user_id == user_id && e.is_approved())
        .filter(|e| e.kind == EntryKind::Expense && config.is_salary_payout(&e.reason))
        .map(|e| e.amount)
        .sum()
}
