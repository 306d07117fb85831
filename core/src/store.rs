//! SQLite persistence layer — the Data Store boundary.
//!
//! RULE: Only the store modules talk to the database. Everything above
//! works on typed records; rows are validated here and unknown enum
//! strings are errors, never silent defaults.

use crate::error::{FundError, FundResult};
use crate::event::EventLogEntry;
use crate::snapshot::FundSnapshot;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

mod customer;
mod employee;
mod ledger;
mod period;

pub struct FundStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl FundStore {
    pub fn open(path: &str) -> FundResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> FundResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases this returns a fresh, isolated database.
    pub fn reopen(&self) -> FundResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> FundResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../migrations/002_fund_periods.sql"))?;
        self.conn
            .execute_batch(include_str!("../../migrations/003_kpi_exclusions.sql"))?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(
        &self,
        period_id: Option<&str>,
        event_type: &str,
        payload: &str,
    ) -> FundResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (period_id, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![period_id, event_type, payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn events_for_period(&self, period_id: &str) -> FundResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, period_id, event_type, payload, created_at
             FROM event_log WHERE period_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![period_id], |row| {
            Ok(EventLogEntry {
                id: row.get(0)?,
                period_id: row.get(1)?,
                event_type: row.get(2)?,
                payload: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    // ── Snapshot ───────────────────────────────────────────────

    /// Fetch all record sets inside one transaction so the engine sees a
    /// single consistent state (no incremental re-fetch mid-calculation).
    pub fn load_snapshot(&self) -> FundResult<FundSnapshot> {
        let tx = self.conn.unchecked_transaction()?;
        let snapshot = FundSnapshot {
            employees: self.list_employees()?,
            customers: self.list_customers()?,
            entries: self.list_entries()?,
            periods: self.list_periods()?,
            fund_members: self.list_fund_members()?,
            exclusions: self.list_exclusions()?,
            kpi_overrides: self.list_kpi_overrides()?,
        };
        tx.commit()?;
        Ok(snapshot)
    }
}

// ── Row parsing helpers ────────────────────────────────────────

pub(crate) fn invalid(table: &'static str, field: &'static str, value: &str) -> FundError {
    FundError::InvalidRecord {
        table,
        field,
        value: value.to_string(),
    }
}

pub(crate) fn parse_ts(
    table: &'static str,
    field: &'static str,
    raw: &str,
) -> FundResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| invalid(table, field, raw))
}

pub(crate) fn parse_opt_ts(
    table: &'static str,
    field: &'static str,
    raw: Option<String>,
) -> FundResult<Option<DateTime<Utc>>> {
    raw.map(|s| parse_ts(table, field, &s)).transpose()
}

pub(crate) fn parse_date(
    table: &'static str,
    field: &'static str,
    raw: &str,
) -> FundResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid(table, field, raw))
}
