use super::{invalid, parse_opt_ts, parse_ts, FundStore};
use crate::error::FundResult;
use crate::records::{Customer, CustomerStatus, DealDetails, DealStatus};
use rusqlite::params;

type CustomerRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    Option<f64>,
    Option<f64>,
    Option<String>,
    String,
    Option<String>,
);

impl FundStore {
    // ── Customer ──────────────────────────────────────────────

    pub fn insert_customer(&self, c: &Customer) -> FundResult<()> {
        self.conn().execute(
            "INSERT INTO customer (
                id, name, creator_id, sales_rep, source, status, deal_status,
                deal_revenue, deal_actual_revenue, fund_period_id, created_at, won_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                &c.id,
                &c.name,
                &c.creator_id,
                &c.sales_rep,
                &c.source,
                c.status.as_str(),
                c.deal_status.map(|d| d.as_str()),
                c.deal.as_ref().map(|d| d.revenue),
                c.deal.as_ref().map(|d| d.actual_revenue),
                &c.fund_period_id,
                c.created_at.to_rfc3339(),
                c.won_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn list_customers(&self) -> FundResult<Vec<Customer>> {
        self.customers_where("1=1", &[])
    }

    pub fn customers_by_creator(&self, creator_id: &str) -> FundResult<Vec<Customer>> {
        self.customers_where("creator_id = ?1", &[&creator_id])
    }

    fn customers_where(
        &self,
        clause: &str,
        args: &[&dyn rusqlite::types::ToSql],
    ) -> FundResult<Vec<Customer>> {
        let sql = format!(
            "SELECT id, name, creator_id, sales_rep, source, status, deal_status,
                    deal_revenue, deal_actual_revenue, fund_period_id, created_at, won_at
             FROM customer WHERE {clause} ORDER BY id"
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
                    row.get(11)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<CustomerRow>>>()?;

        raw.into_iter().map(customer_from_row).collect()
    }
}

fn customer_from_row(row: CustomerRow) -> FundResult<Customer> {
    let (
        id,
        name,
        creator_id,
        sales_rep,
        source,
        status,
        deal_status,
        deal_revenue,
        deal_actual_revenue,
        fund_period_id,
        created_at,
        won_at,
    ) = row;

    let deal = deal_revenue.map(|revenue| DealDetails {
        revenue,
        actual_revenue: deal_actual_revenue.unwrap_or(0.0),
    });

    Ok(Customer {
        status: CustomerStatus::parse(&status)
            .ok_or_else(|| invalid("customer", "status", &status))?,
        deal_status: deal_status
            .map(|d| DealStatus::parse(&d).ok_or_else(|| invalid("customer", "deal_status", &d)))
            .transpose()?,
        created_at: parse_ts("customer", "created_at", &created_at)?,
        won_at: parse_opt_ts("customer", "won_at", won_at)?,
        id,
        name,
        creator_id,
        sales_rep,
        source,
        deal,
        fund_period_id,
    })
}
