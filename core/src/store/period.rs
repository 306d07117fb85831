use super::{invalid, parse_date, parse_opt_ts, FundStore};
use crate::error::{FundError, FundResult};
use crate::event::{event_type_name, FundEvent};
use crate::records::{FundMember, FundPeriod, KpiOverride, ProfitExclusion};
use chrono::{NaiveDate, Utc};
use rusqlite::params;

impl FundStore {
    // ── Fund periods ──────────────────────────────────────────

    pub fn insert_period(&self, p: &FundPeriod) -> FundResult<()> {
        self.conn().execute(
            "INSERT INTO fund_period (
                id, name, start_date, end_date, manager_id, is_completed, closed_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &p.id,
                &p.name,
                p.start_date.format("%Y-%m-%d").to_string(),
                p.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
                &p.manager_id,
                p.is_completed as i64,
                p.closed_at.map(|d| d.to_rfc3339()),
                p.completed_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn list_periods(&self) -> FundResult<Vec<FundPeriod>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, start_date, end_date, manager_id, is_completed, closed_at, completed_at
             FROM fund_period ORDER BY start_date, id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(
                |(id, name, start, end, manager_id, completed, closed_at, completed_at)| {
                    Ok(FundPeriod {
                        start_date: parse_date("fund_period", "start_date", &start)?,
                        end_date: end
                            .map(|d| parse_date("fund_period", "end_date", &d))
                            .transpose()?,
                        is_completed: completed != 0,
                        closed_at: parse_opt_ts("fund_period", "closed_at", closed_at)?,
                        completed_at: parse_opt_ts("fund_period", "completed_at", completed_at)?,
                        id,
                        name,
                        manager_id,
                    })
                },
            )
            .collect()
    }

    pub fn period_by_id(&self, id: &str) -> FundResult<FundPeriod> {
        self.list_periods()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| FundError::PeriodNotFound(id.to_string()))
    }

    /// Close an open period by setting its end date. The period keeps
    /// accepting settlement runs until it is completed.
    pub fn close_period(&self, id: &str, end_date: NaiveDate) -> FundResult<()> {
        let period = self.period_by_id(id)?;
        if period.is_completed {
            return Err(FundError::PeriodCompleted(id.to_string()));
        }
        self.conn().execute(
            "UPDATE fund_period SET end_date = ?2, closed_at = ?3 WHERE id = ?1",
            params![
                id,
                end_date.format("%Y-%m-%d").to_string(),
                Utc::now().to_rfc3339()
            ],
        )?;
        let event = FundEvent::PeriodClosed {
            period_id: id.to_string(),
        };
        self.append_event(Some(id), event_type_name(&event), &serde_json::to_string(&event)?)?;
        Ok(())
    }

    /// Lock a period. Refuses while pending entries remain unless forced;
    /// a forced completion succeeds, logs at WARN, and is stamped in the
    /// event log so the override is auditable.
    pub fn complete_period(&self, id: &str, force: bool) -> FundResult<()> {
        let period = self.period_by_id(id)?;
        if period.is_completed {
            return Err(FundError::PeriodCompleted(id.to_string()));
        }
        let pending = self.pending_count_for_period(&period)?;
        if pending > 0 {
            if !force {
                return Err(FundError::PendingEntries {
                    period: id.to_string(),
                    count: pending,
                });
            }
            log::warn!("completing period {id} with {pending} pending entries (forced)");
        }
        self.conn().execute(
            "UPDATE fund_period SET is_completed = 1, completed_at = ?2 WHERE id = ?1",
            params![id, Utc::now().to_rfc3339()],
        )?;
        let event = FundEvent::PeriodCompleted {
            period_id: id.to_string(),
            forced: force && pending > 0,
        };
        self.append_event(Some(id), event_type_name(&event), &serde_json::to_string(&event)?)?;
        Ok(())
    }

    // ── Rosters, overrides, exclusions ────────────────────────

    pub fn insert_fund_member(&self, m: &FundMember) -> FundResult<()> {
        self.conn().execute(
            "INSERT INTO fund_member (fund_id, user_id) VALUES (?1, ?2)",
            params![&m.fund_id, &m.user_id],
        )?;
        Ok(())
    }

    pub fn list_fund_members(&self) -> FundResult<Vec<FundMember>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT fund_id, user_id FROM fund_member ORDER BY fund_id, user_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(FundMember {
                fund_id: row.get(0)?,
                user_id: row.get(1)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn insert_kpi_override(&self, o: &KpiOverride) -> FundResult<()> {
        if !(1..=12).contains(&o.month) {
            return Err(invalid("kpi_override", "month", &o.month.to_string()));
        }
        self.conn().execute(
            "INSERT INTO kpi_override (user_id, month, year, target) VALUES (?1, ?2, ?3, ?4)",
            params![&o.user_id, o.month, o.year, o.target],
        )?;
        Ok(())
    }

    pub fn list_kpi_overrides(&self) -> FundResult<Vec<KpiOverride>> {
        let mut stmt = self.conn().prepare(
            "SELECT user_id, month, year, target FROM kpi_override ORDER BY user_id, year, month",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(KpiOverride {
                user_id: row.get(0)?,
                month: row.get(1)?,
                year: row.get(2)?,
                target: row.get(3)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn insert_exclusion(&self, x: &ProfitExclusion) -> FundResult<()> {
        self.conn().execute(
            "INSERT INTO profit_exclusion (user_id, customer_id) VALUES (?1, ?2)",
            params![&x.user_id, &x.customer_id],
        )?;
        Ok(())
    }

    pub fn list_exclusions(&self) -> FundResult<Vec<ProfitExclusion>> {
        let mut stmt = self.conn().prepare(
            "SELECT user_id, customer_id FROM profit_exclusion ORDER BY user_id, customer_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProfitExclusion {
                user_id: row.get(0)?,
                customer_id: row.get(1)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }
}
