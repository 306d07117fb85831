//! Distributable pool and fund overview figures.
//!
//! Only approved entries move any total. The distributable pool adds
//! already-paid salary back on top of net cash: disbursing one employee's
//! payout must not shrink the shareable pool for everyone else.

use crate::config::FundConfig;
use crate::records::{EntryKind, LedgerEntry};
use crate::snapshot::FundSnapshot;
use crate::types::Money;
use serde::{Deserialize, Serialize};

/// The pool the allocator divides: net approved cash plus the salary
/// add-back.
pub fn distributable_pool(entries: &[&LedgerEntry], config: &FundConfig) -> Money {
    let cash_in = total_cash_in(entries);
    let cash_out = total_cash_out(entries);
    let paid_salary: Money = entries
        .iter()
        .filter(|e| e.is_approved() && e.kind == EntryKind::Expense)
        .filter(|e| config.is_salary_payout(&e.reason))
        .map(|e| e.amount)
        .sum();

    cash_in - cash_out + paid_salary
}

fn total_cash_in(entries: &[&LedgerEntry]) -> Money {
    entries
        .iter()
        .filter(|e| e.is_approved())
        .filter(|e| {
            matches!(
                e.kind,
                EntryKind::Deposit | EntryKind::Repayment | EntryKind::LoanRepayment
            ) || (e.kind == EntryKind::Adjustment && e.amount > 0.0)
        })
        .map(|e| e.amount)
        .sum()
}

fn total_cash_out(entries: &[&LedgerEntry]) -> Money {
    entries
        .iter()
        .filter(|e| e.is_approved())
        .filter(|e| {
            matches!(e.kind, EntryKind::Expense | EntryKind::Advance | EntryKind::Loan)
                || (e.kind == EntryKind::Adjustment && e.amount < 0.0)
        })
        .map(|e| e.amount.abs())
        .sum()
}

/// Fund overview for one scope: physical cash, liabilities, and P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundSummary {
    pub total_in: Money,
    pub total_out: Money,
    /// Physical cash on hand, net of the part-time commission liability.
    pub fund_remaining: Money,
    /// Advances taken minus repayments made, floored at zero. Money that
    /// is "gone" until someone pays it back.
    pub net_outstanding_advances: Money,
    /// Commission owed to part-time creators on their approved deposits.
    pub part_time_salary_liability: Money,
    /// Business income: deposits plus positive adjustments.
    pub pnl_revenue: Money,
    /// Permanent outflows: expenses plus negative adjustments. Advances
    /// are not permanent until they stop being repayable.
    pub real_expenses: Money,
    pub pnl_net: Money,
}

impl FundSummary {
    pub fn compute(entries: &[&LedgerEntry], snapshot: &FundSnapshot, config: &FundConfig) -> Self {
        let approved = |e: &&&LedgerEntry| e.is_approved();

        let pnl_revenue: Money = entries
            .iter()
            .filter(approved)
            .filter(|e| {
                e.kind == EntryKind::Deposit
                    || (e.kind == EntryKind::Adjustment && e.amount > 0.0)
            })
            .map(|e| e.amount)
            .sum();

        let real_expenses: Money = entries
            .iter()
            .filter(approved)
            .filter(|e| {
                e.kind == EntryKind::Expense
                    || (e.kind == EntryKind::Adjustment && e.amount < 0.0)
            })
            .map(|e| e.amount.abs())
            .sum();

        let part_time_salary_liability: Money = entries
            .iter()
            .filter(approved)
            .filter(|e| e.kind == EntryKind::Deposit)
            .filter(|e| {
                snapshot
                    .employee(&e.user_id)
                    .map(|emp| emp.is_part_time)
                    .unwrap_or(false)
            })
            .map(|e| e.amount * config.part_time_salary_rate)
            .sum();

        let total_advances: Money = entries
            .iter()
            .filter(approved)
            .filter(|e| e.kind == EntryKind::Advance)
            .map(|e| e.amount)
            .sum();

        let total_repaid: Money = entries
            .iter()
            .filter(approved)
            .filter(|e| e.kind == EntryKind::Repayment)
            .map(|e| e.amount)
            .sum();

        let net_outstanding_advances = (total_advances - total_repaid).max(0.0);

        let total_in = total_cash_in(entries);
        let total_out = total_cash_out(entries);
        let fund_remaining = total_in - total_out - part_time_salary_liability;

        let display_expense =
            real_expenses + part_time_salary_liability + net_outstanding_advances;
        let pnl_net = pnl_revenue - display_expense;

        Self {
            total_in,
            total_out,
            fund_remaining,
            net_outstanding_advances,
            part_time_salary_liability,
            pnl_revenue,
            real_expenses,
            pnl_net,
        }
    }
}
