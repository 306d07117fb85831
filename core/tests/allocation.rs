//! Share allocator tests: equal split, the three adjustment passes, and
//! the conservation behavior of each.

use dealdesk_core::allocator::{allocate_shares, ShareRow};
use dealdesk_core::config::FundConfig;
use dealdesk_core::kpi::KpiResult;
use dealdesk_core::records::{Employee, EmployeeStatus, Role};
use std::collections::HashMap;

fn rep(id: &str) -> Employee {
    Employee {
        id: id.to_string(),
        full_name: format!("Rep {id}"),
        manager_id: None,
        role: Role::Employee,
        is_part_time: false,
        status: EmployeeStatus::Active,
        kpi_monthly_target: Some(5),
    }
}

fn met() -> KpiResult {
    KpiResult { target: 5, actual: 5, missed_units: 0 }
}

fn missed(n: u32) -> KpiResult {
    KpiResult { target: 5, actual: 5 - n, missed_units: n }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn total_share(rows: &[ShareRow]) -> f64 {
    rows.iter().map(|r| r.share).sum()
}

fn row<'a>(rows: &'a [ShareRow], id: &str) -> &'a ShareRow {
    rows.iter().find(|r| r.user_id == id).unwrap()
}

/// A 100M pool over five employees with nothing to adjust splits 20M each
/// at a 20% ratio.
#[test]
fn equal_split_five_ways() {
    let employees: Vec<Employee> = ["a", "b", "c", "d", "e"].iter().map(|id| rep(id)).collect();
    let refs: Vec<&Employee> = employees.iter().collect();
    let kpi: HashMap<_, _> = refs.iter().map(|e| (e.id.clone(), met())).collect();

    let rows = allocate_shares(
        &refs,
        100_000_000.0,
        &kpi,
        &HashMap::new(),
        &HashMap::new(),
        &FundConfig::default(),
    );

    assert_eq!(rows.len(), 5);
    for r in &rows {
        assert!(close(r.base_share, 20_000_000.0), "base {}", r.base_share);
        assert!(close(r.base_ratio, 20.0));
        assert!(close(r.final_ratio, 20.0));
        assert!(close(r.share, 20_000_000.0), "share {}", r.share);
    }
    assert!(close(total_share(&rows), 100_000_000.0));
}

/// Two missed units at the 3% default rate cost 6% of the base share.
/// The 1.2M penalty lands evenly on the four employees who met target.
#[test]
fn missed_kpi_penalty_redistributes() {
    let employees: Vec<Employee> = ["a", "b", "c", "d", "e"].iter().map(|id| rep(id)).collect();
    let refs: Vec<&Employee> = employees.iter().collect();
    let mut kpi: HashMap<_, _> = refs.iter().map(|e| (e.id.clone(), met())).collect();
    kpi.insert("a".to_string(), missed(2));

    let rows = allocate_shares(
        &refs,
        100_000_000.0,
        &kpi,
        &HashMap::new(),
        &HashMap::new(),
        &FundConfig::default(),
    );

    let a = row(&rows, "a");
    assert!(close(a.penalty, 1_200_000.0), "penalty {}", a.penalty);
    assert!(close(a.share, 18_800_000.0), "share {}", a.share);
    assert!(close(a.final_ratio, 18.8), "ratio {}", a.final_ratio);

    for id in ["b", "c", "d", "e"] {
        let r = row(&rows, id);
        assert!(close(r.share, 20_300_000.0), "{id} share {}", r.share);
        assert!(close(r.redistributed_income, 300_000.0));
        assert!(close(r.final_ratio, 20.0), "meeters keep their ratio");
    }
    assert!(close(total_share(&rows), 100_000_000.0), "penalty conserved");
}

/// An excluded customer with 5M of deposits pulls 1M (the owner's 1/5
/// slice) out of the owner's share and spreads it over the other four.
#[test]
fn exclusion_shifts_profit_to_peers() {
    let employees: Vec<Employee> = ["a", "b", "c", "d", "e"].iter().map(|id| rep(id)).collect();
    let refs: Vec<&Employee> = employees.iter().collect();
    let kpi: HashMap<_, _> = refs.iter().map(|e| (e.id.clone(), met())).collect();
    let mut excluded = HashMap::new();
    excluded.insert("b".to_string(), 5_000_000.0);

    let rows = allocate_shares(
        &refs,
        100_000_000.0,
        &kpi,
        &excluded,
        &HashMap::new(),
        &FundConfig::default(),
    );

    let b = row(&rows, "b");
    assert!(close(b.excluded_profit, 5_000_000.0));
    assert!(close(b.share, 19_000_000.0), "share {}", b.share);

    for id in ["a", "c", "d", "e"] {
        let r = row(&rows, id);
        assert!(close(r.share, 20_250_000.0), "{id} share {}", r.share);
        assert!(close(r.redistributed_income, 250_000.0));
    }
    assert!(
        close(total_share(&rows), 100_000_000.0),
        "exclusion moves money, never destroys it"
    );
}

/// With a single eligible employee there is nobody to redistribute to;
/// the excluded slice simply leaves their share.
#[test]
fn single_employee_exclusion_removes_outright() {
    let solo = rep("solo");
    let refs = vec![&solo];
    let mut kpi = HashMap::new();
    kpi.insert("solo".to_string(), met());
    let mut excluded = HashMap::new();
    excluded.insert("solo".to_string(), 4_000_000.0);

    let rows = allocate_shares(
        &refs,
        10_000_000.0,
        &kpi,
        &excluded,
        &HashMap::new(),
        &FundConfig::default(),
    );

    assert_eq!(rows.len(), 1);
    assert!(close(rows[0].share, 6_000_000.0), "share {}", rows[0].share);
    assert!(close(rows[0].redistributed_income, 0.0));
}

/// When every employee missed target there is no one to receive the
/// penalties; the amounts leave the shareable total entirely.
#[test]
fn penalty_without_full_kpi_earners_is_dropped() {
    let employees: Vec<Employee> = ["a", "b"].iter().map(|id| rep(id)).collect();
    let refs: Vec<&Employee> = employees.iter().collect();
    let mut kpi = HashMap::new();
    kpi.insert("a".to_string(), missed(1));
    kpi.insert("b".to_string(), missed(2));

    let rows = allocate_shares(
        &refs,
        40_000_000.0,
        &kpi,
        &HashMap::new(),
        &HashMap::new(),
        &FundConfig::default(),
    );

    // base 20M each; penalties 0.6M and 1.2M with no recipients.
    assert!(close(row(&rows, "a").share, 19_400_000.0));
    assert!(close(row(&rows, "b").share, 18_800_000.0));
    assert!(
        close(total_share(&rows), 40_000_000.0 - 1_800_000.0),
        "dropped penalties shrink the total"
    );
}

/// Personal bonuses are a shared cost: everyone pays total/N and the
/// bonus owner gets their bonus back on top.
#[test]
fn bonus_cost_is_shared() {
    let employees: Vec<Employee> = ["a", "b", "c", "d"].iter().map(|id| rep(id)).collect();
    let refs: Vec<&Employee> = employees.iter().collect();
    let kpi: HashMap<_, _> = refs.iter().map(|e| (e.id.clone(), met())).collect();
    let mut bonuses = HashMap::new();
    bonuses.insert("a".to_string(), 8_000_000.0);

    let rows = allocate_shares(
        &refs,
        80_000_000.0,
        &kpi,
        &HashMap::new(),
        &bonuses,
        &FundConfig::default(),
    );

    let a = row(&rows, "a");
    assert!(close(a.bonus_cost_share, 2_000_000.0));
    assert!(close(a.personal_bonus, 8_000_000.0));
    assert!(close(a.share, 26_000_000.0), "base 20M - 2M cost + 8M bonus");
    for id in ["b", "c", "d"] {
        assert!(close(row(&rows, id).share, 18_000_000.0));
    }
    assert!(close(total_share(&rows), 80_000_000.0), "bonus pass conserves");
}

/// Exclusion runs before penalty and both are computed against the
/// immutable base share, so the final numbers are exactly predictable.
#[test]
fn passes_compound_in_fixed_order() {
    let employees: Vec<Employee> = ["a", "b"].iter().map(|id| rep(id)).collect();
    let refs: Vec<&Employee> = employees.iter().collect();
    let mut kpi = HashMap::new();
    kpi.insert("a".to_string(), missed(1));
    kpi.insert("b".to_string(), met());
    let mut excluded = HashMap::new();
    excluded.insert("a".to_string(), 6_000_000.0);

    let rows = allocate_shares(
        &refs,
        40_000_000.0,
        &kpi,
        &excluded,
        &HashMap::new(),
        &FundConfig::default(),
    );

    // Exclusion: a loses 3M to b. Penalty: 20M base x 3% = 0.6M, a to b.
    let a = row(&rows, "a");
    let b = row(&rows, "b");
    assert!(close(a.share, 16_400_000.0), "a share {}", a.share);
    assert!(close(b.share, 23_600_000.0), "b share {}", b.share);
    assert!(close(a.penalty, 600_000.0), "penalty uses base, not running share");
    assert!(close(total_share(&rows), 40_000_000.0));
}

/// Missing more units can never pay better.
#[test]
fn more_missed_units_never_increase_share() {
    let employees: Vec<Employee> = ["a", "b", "c"].iter().map(|id| rep(id)).collect();
    let refs: Vec<&Employee> = employees.iter().collect();
    let config = FundConfig::default();

    let share_with = |units: u32| {
        let mut kpi: HashMap<_, _> = refs.iter().map(|e| (e.id.clone(), met())).collect();
        if units > 0 {
            kpi.insert("a".to_string(), missed(units));
        }
        let rows = allocate_shares(
            &refs,
            90_000_000.0,
            &kpi,
            &HashMap::new(),
            &HashMap::new(),
            &config,
        );
        row(&rows, "a").share
    };

    let mut previous = share_with(0);
    for units in 1..=5 {
        let current = share_with(units);
        assert!(
            current < previous,
            "share must shrink: {units} units -> {current} vs {previous}"
        );
        previous = current;
    }
}

/// A per-employee penalty rate override beats the default rate.
#[test]
fn penalty_rate_override_applies() {
    let employees: Vec<Employee> = ["a", "b"].iter().map(|id| rep(id)).collect();
    let refs: Vec<&Employee> = employees.iter().collect();
    let mut config = FundConfig::default();
    config
        .penalty_rate_overrides
        .insert("a".to_string(), 0.05);
    let mut kpi = HashMap::new();
    kpi.insert("a".to_string(), missed(2));
    kpi.insert("b".to_string(), met());

    let rows = allocate_shares(
        &refs,
        40_000_000.0,
        &kpi,
        &HashMap::new(),
        &HashMap::new(),
        &config,
    );

    // 20M base x 2 units x 5% = 2M.
    assert!(close(row(&rows, "a").penalty, 2_000_000.0));
}

/// No eligible employees means nothing to distribute, not an error.
#[test]
fn zero_employees_yield_no_rows() {
    let rows = allocate_shares(
        &[],
        100_000_000.0,
        &HashMap::new(),
        &HashMap::new(),
        &HashMap::new(),
        &FundConfig::default(),
    );
    assert!(rows.is_empty());
}
