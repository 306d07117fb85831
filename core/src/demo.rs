//! Deterministic demo dataset seeding.
//!
//! RULE: Nothing here may call a platform RNG. All randomness flows
//! through one Pcg64Mcg stream derived from the caller's seed, and record
//! ids are counter-based, so equal seeds produce byte-identical databases
//! and byte-identical settlement output.

use crate::error::{FundError, FundResult};
use crate::records::{
    AdvanceSubtype, Customer, CustomerStatus, DealDetails, DealStatus, Employee, EmployeeStatus,
    EntryKind, EntryStatus, FundPeriod, KpiOverride, LedgerEntry, ProfitExclusion, Role,
};
use crate::store::FundStore;
use crate::types::EntityId;
use chrono::{NaiveDate, TimeZone, Utc};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct DemoSeedSummary {
    pub period_id: EntityId,
    pub employees: usize,
    pub customers: usize,
    pub entries: usize,
}

struct DemoRng(Pcg64Mcg);

impl DemoRng {
    fn new(seed: u64) -> Self {
        Self(Pcg64Mcg::seed_from_u64(seed))
    }

    fn below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.0.next_u64() % n
    }

    fn chance(&mut self, p: f64) -> bool {
        let bits = self.0.next_u64();
        ((bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)) < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }

    /// A VND amount in [min, max], rounded to the nearest million.
    fn amount(&mut self, min: u64, max: u64) -> f64 {
        let millions = min / 1_000_000 + self.below(max / 1_000_000 - min / 1_000_000 + 1);
        (millions * 1_000_000) as f64
    }
}

const FIRST_NAMES: &[&str] = &[
    "Minh", "Anh", "Huy", "Khanh", "Linh", "Trang", "Quan", "Phuong", "Tuan", "Thao", "Duc",
    "Hang", "Nam", "Mai", "Long", "Ngoc", "Hieu", "Lan", "Son", "Vy",
];

const LAST_NAMES: &[&str] = &[
    "Nguyen", "Tran", "Le", "Pham", "Hoang", "Phan", "Vu", "Dang", "Bui", "Do", "Ho", "Ngo",
];

const SOURCES: &[&str] = &["MKT Group", "MKT Facebook", "Walk-in", "Referral", "Hotline"];

const CAR_MODELS: &[&str] = &[
    "VF 3", "VF 5 Plus", "VF 6", "VF 7", "VF 8", "VF 9", "VF e34", "Herio Green", "Limo Green",
];

/// Populate an empty store with a plausible dealership month: two teams,
/// won deals with deposits, running costs, advances, one personal bonus,
/// one exclusion, and an open accounting period covering the month.
pub fn seed_demo(
    store: &FundStore,
    seed: u64,
    month: u32,
    year: i32,
) -> FundResult<DemoSeedSummary> {
    let mut rng = DemoRng::new(seed);

    let period_id = format!("period-{year}-{month:02}");
    let period_start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(FundError::InvalidRecord {
        table: "fund_period",
        field: "start_date",
        value: format!("{year}-{month:02}-01"),
    })?;
    store.insert_period(&FundPeriod {
        id: period_id.clone(),
        name: format!("Fund {month}/{year}"),
        start_date: period_start,
        end_date: None,
        manager_id: None,
        is_completed: false,
        closed_at: None,
        completed_at: None,
    })?;

    // One owner, two team leads, six sales reps (one part-time).
    let mut employees: Vec<Employee> = Vec::new();
    let owner = make_employee(&mut rng, "emp-owner", Role::Owner, None, false);
    employees.push(owner);
    for lead_no in 0..2 {
        let lead_id = format!("emp-lead-{lead_no}");
        employees.push(make_employee(&mut rng, &lead_id, Role::TeamLead, None, false));
        for rep_no in 0..3 {
            let rep_id = format!("emp-{lead_no}-{rep_no}");
            let part_time = lead_no == 1 && rep_no == 2;
            employees.push(make_employee(
                &mut rng,
                &rep_id,
                Role::Employee,
                Some(lead_id.clone()),
                part_time,
            ));
        }
    }
    for e in &employees {
        store.insert_employee(e)?;
    }

    // One rep gets a lighter target this month.
    store.insert_kpi_override(&KpiOverride {
        user_id: "emp-0-1".to_string(),
        month,
        year,
        target: 2,
    })?;

    let reps: Vec<&Employee> = employees
        .iter()
        .filter(|e| e.role == Role::Employee)
        .collect();

    let mut customers = 0usize;
    let mut entries = 0usize;
    let mut first_won_customer: Option<EntityId> = None;

    for i in 0..24u32 {
        let rep = reps[rng.below(reps.len() as u64) as usize];
        let day = 1 + rng.below(27) as u32;
        let created_at = Utc
            .with_ymd_and_hms(year, month, day, 2 + rng.below(10) as u32, 0, 0)
            .unwrap();
        let won = rng.chance(0.45);
        let customer_id = format!("cust-{i:03}");
        let revenue = rng.amount(300_000_000, 1_200_000_000);

        store.insert_customer(&Customer {
            id: customer_id.clone(),
            name: format!("{} {}", rng.pick(LAST_NAMES), rng.pick(FIRST_NAMES)),
            creator_id: rep.id.clone(),
            sales_rep: rep.full_name.clone(),
            source: Some(rng.pick(SOURCES).to_string()),
            status: if won {
                CustomerStatus::Won
            } else {
                CustomerStatus::Potential
            },
            deal_status: won.then_some(DealStatus::Processing),
            deal: won.then(|| DealDetails {
                revenue,
                actual_revenue: 0.0,
            }),
            fund_period_id: None,
            created_at,
            won_at: won.then_some(created_at),
        })?;
        customers += 1;

        if won {
            if first_won_customer.is_none() {
                first_won_customer = Some(customer_id.clone());
            }
            // Deposit between 3% and 10% of the deal.
            let deposit = (revenue * (0.03 + rng.below(8) as f64 * 0.01) / 1_000_000.0).round()
                * 1_000_000.0;
            store.insert_entry(&LedgerEntry {
                id: format!("entry-dep-{i:03}"),
                customer_id: Some(customer_id.clone()),
                user_id: rep.id.clone(),
                kind: EntryKind::Deposit,
                subtype: None,
                amount: deposit,
                reason: format!("Deposit {}", rng.pick(CAR_MODELS)),
                status: EntryStatus::Approved,
                approved_by: Some("emp-owner".to_string()),
                fund_period_id: None,
                created_at,
            })?;
            entries += 1;
        }
    }

    // Running costs and an occasional advance.
    for j in 0..6u32 {
        let rep = reps[rng.below(reps.len() as u64) as usize];
        let day = 1 + rng.below(27) as u32;
        let created_at = Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap();
        let is_advance = j % 2 == 0;
        store.insert_entry(&LedgerEntry {
            id: format!("entry-out-{j:02}"),
            customer_id: None,
            user_id: rep.id.clone(),
            kind: if is_advance {
                EntryKind::Advance
            } else {
                EntryKind::Expense
            },
            subtype: is_advance.then_some(if rng.chance(0.5) {
                AdvanceSubtype::Deductible
            } else {
                AdvanceSubtype::Refundable
            }),
            amount: rng.amount(2_000_000, 20_000_000),
            reason: if is_advance {
                "Customer entertainment advance".to_string()
            } else {
                "Office running costs".to_string()
            },
            status: if rng.chance(0.8) {
                EntryStatus::Approved
            } else {
                EntryStatus::Pending
            },
            approved_by: None,
            fund_period_id: None,
            created_at,
        })?;
        entries += 1;
    }

    // One demo-vehicle bonus, shared by the team.
    store.insert_entry(&LedgerEntry {
        id: "entry-bonus-00".to_string(),
        customer_id: None,
        user_id: "emp-0-0".to_string(),
        kind: EntryKind::PersonalBonus,
        subtype: None,
        amount: 10_000_000.0,
        reason: "Demo vehicle credit".to_string(),
        status: EntryStatus::Approved,
        approved_by: Some("emp-owner".to_string()),
        fund_period_id: None,
        created_at: Utc.with_ymd_and_hms(year, month, 15, 9, 0, 0).unwrap(),
    })?;
    entries += 1;

    // First won deal is excluded from its creator's pool contribution.
    if let Some(customer_id) = first_won_customer {
        let creator = store
            .list_customers()?
            .into_iter()
            .find(|c| c.id == customer_id)
            .map(|c| c.creator_id)
            .expect("customer just inserted");
        store.insert_exclusion(&ProfitExclusion {
            user_id: creator,
            customer_id,
        })?;
    }

    Ok(DemoSeedSummary {
        period_id,
        employees: employees.len(),
        customers,
        entries,
    })
}

fn make_employee(
    rng: &mut DemoRng,
    id: &str,
    role: Role,
    manager_id: Option<EntityId>,
    is_part_time: bool,
) -> Employee {
    Employee {
        id: id.to_string(),
        full_name: format!("{} {}", rng.pick(LAST_NAMES), rng.pick(FIRST_NAMES)),
        manager_id,
        role,
        is_part_time,
        status: EmployeeStatus::Active,
        kpi_monthly_target: (role == Role::Employee).then_some(3),
    }
}
