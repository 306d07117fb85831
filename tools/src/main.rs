//! fund-runner: headless settlement runner for dealdesk.
//!
//! Usage:
//!   fund-runner --seed 42 --month 8 --year 2026 --db fund.db
//!   fund-runner --db fund.db --period period-2026-08 --payout

use anyhow::Result;
use chrono::{Datelike, Utc};
use dealdesk_core::{
    calendar::CalendarSelection,
    config::FundConfig,
    demo::seed_demo,
    engine::{PeriodFilter, SettlementEngine},
    event::{event_type_name, FundEvent},
    period::TeamScope,
    pool::FundSummary,
    store::FundStore,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let now = Utc::now();
    let seed = parse_arg(&args, "--seed", 42u64);
    let month = parse_arg(&args, "--month", now.month());
    let year = parse_arg(&args, "--year", now.year());
    let payout = args.iter().any(|a| a == "--payout");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let period_arg = str_arg(&args, "--period");
    let config = match str_arg(&args, "--config") {
        Some(path) => FundConfig::load(Path::new(path))?,
        None => FundConfig::default(),
    };

    println!("dealdesk — fund-runner");
    println!("  seed:   {seed}");
    println!("  window: {month}/{year}");
    println!("  db:     {db}");
    println!();

    let store = FundStore::open(db)?;
    store.migrate()?;

    let seeded_period = if store.list_employees()?.is_empty() {
        let summary = seed_demo(&store, seed, month, year)?;
        println!(
            "seeded demo data: {} employees, {} customers, {} ledger entries",
            summary.employees, summary.customers, summary.entries
        );
        println!();
        Some(summary.period_id)
    } else {
        None
    };

    let period_id = period_arg.map(str::to_string).or(seeded_period);

    let snapshot = store.load_snapshot()?;
    let engine = SettlementEngine::new(config);
    let filter = PeriodFilter {
        period_id: period_id.clone(),
        calendar: CalendarSelection::Month { month, year },
        scope: TeamScope::All,
    };

    let rows = engine.compute(&snapshot, &filter)?;
    if rows.is_empty() {
        println!("no eligible employees — nothing to distribute");
        return Ok(());
    }

    println!(
        "{:<20} {:>6} {:>14} {:>9} {:>14} {:>14} {:>14}",
        "employee", "kpi", "base share", "ratio", "penalty", "adjusted", "net payable"
    );
    for row in &rows {
        let a = &row.allocation;
        println!(
            "{:<20} {:>3}/{:<3} {:>14.0} {:>8.2}% {:>14.0} {:>14.0} {:>14.0}",
            a.full_name,
            a.kpi.actual,
            a.kpi.target,
            a.base_share,
            a.final_ratio,
            a.penalty,
            a.share,
            row.net_payable,
        );
    }
    println!();

    let pool = rows.iter().map(|r| r.allocation.base_share).sum::<f64>();
    let summary = FundSummary::compute(
        &snapshot.entries.iter().collect::<Vec<_>>(),
        &snapshot,
        engine.config(),
    );
    println!("pool:                {pool:>16.0}");
    println!("fund remaining:      {:>16.0}", summary.fund_remaining);
    println!("outstanding advance: {:>16.0}", summary.net_outstanding_advances);
    println!("part-time liability: {:>16.0}", summary.part_time_salary_liability);
    println!("net P&L:             {:>16.0}", summary.pnl_net);

    let event = FundEvent::SettlementComputed {
        period_id: period_id.clone(),
        employee_count: rows.len(),
        pool,
    };
    store.append_event(
        period_id.as_deref(),
        event_type_name(&event),
        &serde_json::to_string(&event)?,
    )?;

    if payout {
        let written = engine.record_payouts(&store, &rows, period_id.as_deref(), None)?;
        println!();
        println!("recorded {written} payout entries");
    }

    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
