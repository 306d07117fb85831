//! Net settlement and pool tests: deductions, the salary add-back, and
//! the payout write-back loop.

use chrono::{NaiveDate, TimeZone, Utc};
use dealdesk_core::calendar::CalendarSelection;
use dealdesk_core::config::FundConfig;
use dealdesk_core::engine::{PeriodFilter, SettlementEngine};
use dealdesk_core::kpi::KpiResult;
use dealdesk_core::period::TeamScope;
use dealdesk_core::pool::{distributable_pool, FundSummary};
use dealdesk_core::records::{
    AdvanceSubtype, Employee, EmployeeStatus, EntryKind, EntryStatus, FundPeriod, LedgerEntry, Role,
};
use dealdesk_core::settlement::settle;
use dealdesk_core::snapshot::FundSnapshot;
use dealdesk_core::store::FundStore;
use std::collections::HashMap;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn rep(id: &str) -> Employee {
    Employee {
        id: id.to_string(),
        full_name: format!("Rep {id}"),
        manager_id: None,
        role: Role::Employee,
        is_part_time: false,
        status: EmployeeStatus::Active,
        kpi_monthly_target: None,
    }
}

fn entry(id: &str, user: &str, kind: EntryKind, amount: f64) -> LedgerEntry {
    LedgerEntry {
        id: id.to_string(),
        customer_id: None,
        user_id: user.to_string(),
        kind,
        subtype: None,
        amount,
        reason: "test entry".to_string(),
        status: EntryStatus::Approved,
        approved_by: None,
        fund_period_id: None,
        created_at: Utc.with_ymd_and_hms(2026, 8, 10, 3, 0, 0).unwrap(),
    }
}

fn allocate_solo(pool: f64) -> dealdesk_core::allocator::ShareRow {
    let solo = rep("a");
    let mut kpi = HashMap::new();
    kpi.insert("a".to_string(), KpiResult { target: 0, actual: 0, missed_units: 0 });
    dealdesk_core::allocator::allocate_shares(
        &[&solo],
        pool,
        &kpi,
        &HashMap::new(),
        &HashMap::new(),
        &FundConfig::default(),
    )
    .remove(0)
}

/// A 20M share minus a 2M deductible advance and 10M of salary already
/// disbursed nets to 8M. Refundable and pending advances never deduct.
#[test]
fn net_payable_deducts_advances_and_paid_salary() {
    let config = FundConfig::default();
    let mut advance = entry("adv-1", "a", EntryKind::Advance, 2_000_000.0);
    advance.subtype = Some(AdvanceSubtype::Deductible);

    let mut refundable = entry("adv-2", "a", EntryKind::Advance, 3_000_000.0);
    refundable.subtype = Some(AdvanceSubtype::Refundable);

    let mut pending = entry("adv-3", "a", EntryKind::Advance, 7_000_000.0);
    pending.subtype = Some(AdvanceSubtype::Deductible);
    pending.status = EntryStatus::Pending;

    let mut salary = entry("sal-1", "a", EntryKind::Expense, 10_000_000.0);
    salary.reason = "Salary payout Rep a [salary]".to_string();

    let entries = [&advance, &refundable, &pending, &salary];
    let row = settle(allocate_solo(20_000_000.0), &entries, &config);

    assert!(close(row.advance_deductions, 2_000_000.0), "{}", row.advance_deductions);
    assert!(close(row.paid_salary, 10_000_000.0), "{}", row.paid_salary);
    assert!(close(row.net_payable, 8_000_000.0), "{}", row.net_payable);
}

/// An employee who drew more than they earned ends negative; the figure
/// is reported as-is, never clamped.
#[test]
fn negative_net_payable_is_preserved() {
    let config = FundConfig::default();
    let mut advance = entry("adv-1", "a", EntryKind::Advance, 6_000_000.0);
    advance.subtype = Some(AdvanceSubtype::Deductible);

    let row = settle(allocate_solo(5_000_000.0), &[&advance], &config);
    assert!(close(row.net_payable, -1_000_000.0), "{}", row.net_payable);
}

/// Paid salary flows back into the distributable pool, so disbursing one
/// payout does not shrink everyone else's share.
#[test]
fn paid_salary_adds_back_into_pool() {
    let config = FundConfig::default();
    let deposit = entry("dep-1", "a", EntryKind::Deposit, 50_000_000.0);
    let mut salary = entry("sal-1", "a", EntryKind::Expense, 10_000_000.0);
    salary.reason = "Salary payout Rep a [salary]".to_string();
    let rent = entry("exp-1", "a", EntryKind::Expense, 5_000_000.0);

    let pool = distributable_pool(&[&deposit, &salary, &rent], &config);
    assert!(close(pool, 45_000_000.0), "50 - 15 + 10 salary add-back, got {pool}");
}

/// Every entry kind lands on the right side of the cash ledger, and
/// pending rows move nothing.
#[test]
fn pool_classifies_entry_kinds() {
    let config = FundConfig::default();
    let entries = vec![
        entry("e1", "a", EntryKind::Deposit, 10.0),
        entry("e2", "a", EntryKind::Repayment, 2.0),
        entry("e3", "a", EntryKind::LoanRepayment, 1.0),
        entry("e4", "a", EntryKind::Adjustment, 3.0),
        entry("e5", "a", EntryKind::Expense, 4.0),
        entry("e6", "a", EntryKind::Advance, 2.0),
        entry("e7", "a", EntryKind::Loan, 1.0),
        entry("e8", "a", EntryKind::Adjustment, -2.0),
        entry("e9", "a", EntryKind::PersonalBonus, 100.0),
        entry("e10", "a", EntryKind::DealerDebt, 50.0),
        {
            let mut e = entry("e11", "a", EntryKind::Deposit, 99.0);
            e.status = EntryStatus::Pending;
            e
        },
    ];
    let refs: Vec<&LedgerEntry> = entries.iter().collect();

    // in: 10 + 2 + 1 + 3 = 16; out: 4 + 2 + 1 + 2 = 9.
    let pool = distributable_pool(&refs, &config);
    assert!(close(pool, 7.0), "got {pool}");
}

/// Fund summary figures: part-time commission liability, outstanding
/// advances floored at zero, and cash on hand net of the liability.
#[test]
fn fund_summary_tracks_liabilities() {
    let config = FundConfig::default();
    let mut part_timer = rep("pt");
    part_timer.is_part_time = true;

    let snapshot = FundSnapshot {
        employees: vec![rep("a"), part_timer],
        ..Default::default()
    };

    let entries = vec![
        entry("e1", "pt", EntryKind::Deposit, 10_000_000.0),
        entry("e2", "a", EntryKind::Deposit, 20_000_000.0),
        entry("e3", "a", EntryKind::Advance, 5_000_000.0),
        entry("e4", "a", EntryKind::Repayment, 8_000_000.0),
        entry("e5", "a", EntryKind::Expense, 4_000_000.0),
    ];
    let refs: Vec<&LedgerEntry> = entries.iter().collect();
    let summary = FundSummary::compute(&refs, &snapshot, &config);

    assert!(close(summary.part_time_salary_liability, 3_000_000.0), "30% of 10M");
    assert!(close(summary.net_outstanding_advances, 0.0), "repaid more than drawn");
    assert!(close(summary.total_in, 38_000_000.0));
    assert!(close(summary.total_out, 9_000_000.0));
    assert!(close(summary.fund_remaining, 26_000_000.0), "in - out - liability");
    assert!(close(summary.pnl_revenue, 30_000_000.0));
    assert!(close(summary.real_expenses, 4_000_000.0));
}

/// After payouts are committed and the snapshot re-fetched, everyone's
/// net payable settles to zero: the share survives (salary add-back) and
/// the paid salary now nets against it.
#[test]
fn payout_then_recompute_nets_to_zero() {
    let store = FundStore::in_memory().unwrap();
    store.migrate().unwrap();

    store.insert_period(&FundPeriod {
        id: "p-1".to_string(),
        name: "Fund 8/2026".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        end_date: None,
        manager_id: None,
        is_completed: false,
        closed_at: None,
        completed_at: None,
    }).unwrap();
    store.insert_employee(&rep("a")).unwrap();
    store.insert_employee(&rep("b")).unwrap();
    store
        .insert_entry(&entry("dep-1", "a", EntryKind::Deposit, 30_000_000.0))
        .unwrap();

    let engine = SettlementEngine::new(FundConfig::default());
    let filter = PeriodFilter {
        period_id: Some("p-1".to_string()),
        calendar: CalendarSelection::All,
        scope: TeamScope::All,
    };

    let rows = engine.compute(&store.load_snapshot().unwrap(), &filter).unwrap();
    assert_eq!(rows.len(), 2);
    for r in &rows {
        assert!(close(r.net_payable, 15_000_000.0), "{}", r.net_payable);
    }

    let written = engine
        .record_payouts(&store, &rows, Some("p-1"), None)
        .unwrap();
    assert_eq!(written, 2);

    let rows = engine.compute(&store.load_snapshot().unwrap(), &filter).unwrap();
    for r in &rows {
        assert!(close(r.allocation.share, 15_000_000.0), "share survives the payout");
        assert!(close(r.net_payable, 0.0), "paid out in full, got {}", r.net_payable);
    }
}
