use super::{invalid, FundStore};
use crate::error::FundResult;
use crate::records::{Employee, EmployeeStatus, Role};
use rusqlite::params;

impl FundStore {
    // ── Employee ──────────────────────────────────────────────

    pub fn insert_employee(&self, e: &Employee) -> FundResult<()> {
        self.conn().execute(
            "INSERT INTO employee (
                id, full_name, manager_id, role, is_part_time, status, kpi_monthly_target
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &e.id,
                &e.full_name,
                &e.manager_id,
                e.role.as_str(),
                e.is_part_time as i64,
                e.status.as_str(),
                e.kpi_monthly_target,
            ],
        )?;
        Ok(())
    }

    pub fn list_employees(&self) -> FundResult<Vec<Employee>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, full_name, manager_id, role, is_part_time, status, kpi_monthly_target
             FROM employee ORDER BY id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<u32>>(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(id, full_name, manager_id, role, part_time, status, target)| {
                Ok(Employee {
                    id,
                    full_name,
                    manager_id,
                    role: Role::parse(&role).ok_or_else(|| invalid("employee", "role", &role))?,
                    is_part_time: part_time != 0,
                    status: EmployeeStatus::parse(&status)
                        .ok_or_else(|| invalid("employee", "status", &status))?,
                    kpi_monthly_target: target,
                })
            })
            .collect()
    }

    pub fn set_kpi_monthly_target(&self, user_id: &str, target: Option<u32>) -> FundResult<()> {
        self.conn().execute(
            "UPDATE employee SET kpi_monthly_target = ?2 WHERE id = ?1",
            params![user_id, target],
        )?;
        Ok(())
    }
}
