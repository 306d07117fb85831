use super::{invalid, parse_ts, FundStore};
use crate::calendar::local_date;
use crate::error::{FundError, FundResult};
use crate::event::{event_type_name, FundEvent};
use crate::records::{AdvanceSubtype, EntryKind, EntryStatus, FundPeriod, LedgerEntry};
use crate::types::{EntityId, Money};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

type EntryRow = (
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    f64,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
);

impl FundStore {
    // ── Ledger ────────────────────────────────────────────────

    pub fn insert_entry(&self, e: &LedgerEntry) -> FundResult<()> {
        self.conn().execute(
            "INSERT INTO ledger_entry (
                id, customer_id, user_id, kind, subtype, amount, reason,
                status, approved_by, fund_period_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                &e.id,
                &e.customer_id,
                &e.user_id,
                e.kind.as_str(),
                e.subtype.map(|s| s.as_str()),
                e.amount,
                &e.reason,
                e.status.as_str(),
                &e.approved_by,
                &e.fund_period_id,
                e.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_entries(&self) -> FundResult<Vec<LedgerEntry>> {
        self.entries_where("1=1", &[])
    }

    pub fn entries_by_user(&self, user_id: &str) -> FundResult<Vec<LedgerEntry>> {
        self.entries_where("user_id = ?1", &[&user_id])
    }

    pub fn entries_by_status(&self, status: EntryStatus) -> FundResult<Vec<LedgerEntry>> {
        self.entries_where("status = ?1", &[&status.as_str()])
    }

    fn entries_where(
        &self,
        clause: &str,
        args: &[&dyn rusqlite::types::ToSql],
    ) -> FundResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT id, customer_id, user_id, kind, subtype, amount, reason,
                    status, approved_by, fund_period_id, created_at
             FROM ledger_entry WHERE {clause} ORDER BY created_at, id"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let raw = stmt
            .query_map(args, |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                    row.get(9)?,
                    row.get(10)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<EntryRow>>>()?;

        raw.into_iter().map(entry_from_row).collect()
    }

    // ── Ledger commands ───────────────────────────────────────

    /// Move a pending entry to approved or rejected. Approved entries are
    /// final; re-approving is a no-op error surfaced to the caller.
    pub fn approve_entry(&self, entry_id: &str, approver: &str, approve: bool) -> FundResult<()> {
        let status = if approve {
            EntryStatus::Approved
        } else {
            EntryStatus::Rejected
        };
        let changed = self.conn().execute(
            "UPDATE ledger_entry SET status = ?2, approved_by = ?3
             WHERE id = ?1 AND status = 'pending'",
            params![entry_id, status.as_str(), approver],
        )?;
        if changed == 0 {
            return Err(FundError::InvalidRecord {
                table: "ledger_entry",
                field: "status",
                value: format!("{entry_id} is not pending"),
            });
        }

        let entry = self.entry_by_id(entry_id)?;
        let event = if approve {
            FundEvent::EntryApproved {
                entry_id: entry.id.clone(),
                user_id: entry.user_id.clone(),
                amount: entry.amount,
            }
        } else {
            FundEvent::EntryRejected {
                entry_id: entry.id.clone(),
                user_id: entry.user_id.clone(),
            }
        };
        self.append_event(
            entry.fund_period_id.as_deref(),
            event_type_name(&event),
            &serde_json::to_string(&event)?,
        )?;
        Ok(())
    }

    pub fn entry_by_id(&self, entry_id: &str) -> FundResult<LedgerEntry> {
        self.entries_where("id = ?1", &[&entry_id])?
            .into_iter()
            .next()
            .ok_or_else(|| {
                FundError::InvalidRecord {
                    table: "ledger_entry",
                    field: "id",
                    value: entry_id.to_string(),
                }
            })
    }

    /// Insert an approved salary-payout expense. Returns the new entry id.
    pub fn record_payout(
        &self,
        user_id: &str,
        amount: Money,
        period_id: Option<&str>,
        reason: &str,
    ) -> FundResult<EntityId> {
        let id = Uuid::new_v4().to_string();
        self.insert_entry(&LedgerEntry {
            id: id.clone(),
            customer_id: None,
            user_id: user_id.to_string(),
            kind: EntryKind::Expense,
            subtype: None,
            amount,
            reason: reason.to_string(),
            status: EntryStatus::Approved,
            approved_by: None,
            fund_period_id: period_id.map(str::to_string),
            created_at: Utc::now(),
        })?;
        Ok(id)
    }

    /// Close out a refundable advance with a new approved repayment entry
    /// carrying a `[ref:<id>]` back-reference. The original is never
    /// edited — the ledger is append-only once approved.
    pub fn record_repayment(
        &self,
        original: &LedgerEntry,
        approver: &str,
        repaid_tag: &str,
    ) -> FundResult<EntityId> {
        let id = Uuid::new_v4().to_string();
        self.insert_entry(&LedgerEntry {
            id: id.clone(),
            customer_id: original.customer_id.clone(),
            user_id: original.user_id.clone(),
            kind: EntryKind::Repayment,
            subtype: None,
            amount: original.amount,
            reason: format!("{} {} [ref:{}]", original.reason, repaid_tag, original.id),
            status: EntryStatus::Approved,
            approved_by: Some(approver.to_string()),
            fund_period_id: original.fund_period_id.clone(),
            created_at: Utc::now(),
        })?;
        Ok(id)
    }

    /// Pending entries attached to a period, by explicit assignment or
    /// date range. Used as the completion guard.
    ///
    /// Membership follows the same rule as the resolver: explicit
    /// assignment wins, otherwise the entry's anchor timestamp (its
    /// customer's create date, else its own) is bucketed on local dates.
    pub fn pending_count_for_period(&self, period: &FundPeriod) -> FundResult<i64> {
        let mut count = 0i64;
        for entry in self.entries_by_status(EntryStatus::Pending)? {
            let in_period = match &entry.fund_period_id {
                Some(assigned) => *assigned == period.id,
                None => {
                    let anchor = match entry.customer_id.as_deref() {
                        Some(id) => self.customer_created_at(id)?.unwrap_or(entry.created_at),
                        None => entry.created_at,
                    };
                    period.contains_date(local_date(anchor))
                }
            };
            if in_period {
                count += 1;
            }
        }
        Ok(count)
    }

    fn customer_created_at(&self, customer_id: &str) -> FundResult<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT created_at FROM customer WHERE id = ?1",
                params![customer_id],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|s| parse_ts("customer", "created_at", &s)).transpose()
    }
}

fn entry_from_row(row: EntryRow) -> FundResult<LedgerEntry> {
    let (
        id,
        customer_id,
        user_id,
        kind,
        subtype,
        amount,
        reason,
        status,
        approved_by,
        fund_period_id,
        created_at,
    ) = row;

    Ok(LedgerEntry {
        kind: EntryKind::parse(&kind).ok_or_else(|| invalid("ledger_entry", "kind", &kind))?,
        subtype: subtype
            .map(|s| {
                AdvanceSubtype::parse(&s).ok_or_else(|| invalid("ledger_entry", "subtype", &s))
            })
            .transpose()?,
        status: EntryStatus::parse(&status)
            .ok_or_else(|| invalid("ledger_entry", "status", &status))?,
        created_at: parse_ts("ledger_entry", "created_at", &created_at)?,
        id,
        customer_id,
        user_id,
        amount,
        reason,
        approved_by,
        fund_period_id,
    })
}
