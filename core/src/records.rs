//! Typed domain records.
//!
//! RULE: Every enum round-trips through a stable snake_case string.
//! The store maps rows into these types at the boundary and rejects
//! unknown strings — nothing downstream handles raw backend shapes.

use crate::types::{EntityId, Money};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Employees ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    TeamLead,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::TeamLead => "team_lead",
            Self::Owner => "owner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "employee" => Some(Self::Employee),
            "team_lead" => Some(Self::TeamLead),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Pending,
    Blocked,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: EntityId,
    pub full_name: String,
    pub manager_id: Option<EntityId>,
    pub role: Role,
    pub is_part_time: bool,
    pub status: EmployeeStatus,
    /// Expected won deals per month. None means "no target set" — such an
    /// employee can never be penalized.
    pub kpi_monthly_target: Option<u32>,
}

impl Employee {
    /// Base profit-sharing eligibility: full-time, active, not an owner.
    /// Period rosters and team scope narrow this further.
    pub fn is_base_eligible(&self) -> bool {
        !self.is_part_time && self.status == EmployeeStatus::Active && self.role != Role::Owner
    }
}

// ── Customers ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    New,
    Contacted,
    Potential,
    Won,
    WonPending,
    Lost,
    LostPending,
    AfterSales,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Potential => "potential",
            Self::Won => "won",
            Self::WonPending => "won_pending",
            Self::Lost => "lost",
            Self::LostPending => "lost_pending",
            Self::AfterSales => "after_sales",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "potential" => Some(Self::Potential),
            "won" => Some(Self::Won),
            "won_pending" => Some(Self::WonPending),
            "lost" => Some(Self::Lost),
            "lost_pending" => Some(Self::LostPending),
            "after_sales" => Some(Self::AfterSales),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Processing,
    CompletedPending,
    Completed,
    RefundPending,
    Refunded,
    SuspendedPending,
    Suspended,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::CompletedPending => "completed_pending",
            Self::Completed => "completed",
            Self::RefundPending => "refund_pending",
            Self::Refunded => "refunded",
            Self::SuspendedPending => "suspended_pending",
            Self::Suspended => "suspended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(Self::Processing),
            "completed_pending" => Some(Self::CompletedPending),
            "completed" => Some(Self::Completed),
            "refund_pending" => Some(Self::RefundPending),
            "refunded" => Some(Self::Refunded),
            "suspended_pending" => Some(Self::SuspendedPending),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }

    /// Suspended deals (confirmed or awaiting confirmation) never count
    /// toward KPI or revenue.
    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended | Self::SuspendedPending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealDetails {
    /// Revenue expected when the deal was won.
    pub revenue: Money,
    /// Revenue actually collected so far.
    pub actual_revenue: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: EntityId,
    pub name: String,
    pub creator_id: EntityId,
    pub sales_rep: String,
    pub source: Option<String>,
    pub status: CustomerStatus,
    pub deal_status: Option<DealStatus>,
    pub deal: Option<DealDetails>,
    /// Explicit period assignment. Overrides date-range membership.
    pub fund_period_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
    pub won_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// The date a customer counts under for KPI purposes: when the deal
    /// closed, falling back to creation time for legacy rows.
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.won_at.unwrap_or(self.created_at)
    }
}

// ── Ledger ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Deposit,
    Expense,
    Advance,
    Loan,
    Repayment,
    LoanRepayment,
    Adjustment,
    PersonalBonus,
    DealerDebt,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Expense => "expense",
            Self::Advance => "advance",
            Self::Loan => "loan",
            Self::Repayment => "repayment",
            Self::LoanRepayment => "loan_repayment",
            Self::Adjustment => "adjustment",
            Self::PersonalBonus => "personal_bonus",
            Self::DealerDebt => "dealer_debt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(Self::Deposit),
            "expense" => Some(Self::Expense),
            "advance" => Some(Self::Advance),
            "loan" => Some(Self::Loan),
            "repayment" => Some(Self::Repayment),
            "loan_repayment" => Some(Self::LoanRepayment),
            "adjustment" => Some(Self::Adjustment),
            "personal_bonus" => Some(Self::PersonalBonus),
            "dealer_debt" => Some(Self::DealerDebt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceSubtype {
    /// Paid back in cash; a repayment entry closes it out.
    Refundable,
    /// Deducted from the employee's settlement share.
    Deductible,
}

impl AdvanceSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Refundable => "refundable",
            Self::Deductible => "deductible",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "refundable" => Some(Self::Refundable),
            "deductible" => Some(Self::Deductible),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// One row of the append-only ledger. Approved entries are never edited in
/// place — a repayment or reversal is a new entry carrying `[ref:<id>]` in
/// its reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntityId,
    pub customer_id: Option<EntityId>,
    pub user_id: EntityId,
    pub kind: EntryKind,
    pub subtype: Option<AdvanceSubtype>,
    /// Signed only for Adjustment; every other kind holds a positive amount
    /// whose direction is implied by the kind.
    pub amount: Money,
    pub reason: String,
    pub status: EntryStatus,
    pub approved_by: Option<EntityId>,
    pub fund_period_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn is_approved(&self) -> bool {
        self.status == EntryStatus::Approved
    }
}

// ── Periods, rosters, overrides, exclusions ────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundPeriod {
    pub id: EntityId,
    pub name: String,
    pub start_date: NaiveDate,
    /// Inclusive, end-of-day. None = still open, runs to +inf.
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<EntityId>,
    pub is_completed: bool,
    pub closed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FundPeriod {
    /// Date-range membership, on local dates. Explicit assignment is
    /// checked by the resolver before this.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundMember {
    pub fund_id: EntityId,
    pub user_id: EntityId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiOverride {
    pub user_id: EntityId,
    pub month: u32,
    pub year: i32,
    pub target: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitExclusion {
    pub user_id: EntityId,
    pub customer_id: EntityId,
}
