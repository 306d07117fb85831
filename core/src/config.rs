//! Engine configuration.
//!
//! Everything the settlement pipeline treats as policy rather than data
//! lives here and is injected explicitly — no module-level globals. Loaded
//! from a JSON file in production, `Default` in tests and the demo runner.

use crate::types::{EntityId, Ratio};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundConfig {
    /// Case-insensitive substring a customer's source must carry to count
    /// toward the shared fund (the dealership's lead-source program).
    #[serde(default = "default_lead_source")]
    pub lead_source_filter: String,

    /// Penalty per missed KPI unit, as a fraction of the equal base share.
    #[serde(default = "default_penalty_rate")]
    pub default_penalty_rate: Ratio,

    /// Per-employee penalty rate overrides.
    #[serde(default)]
    pub penalty_rate_overrides: HashMap<EntityId, Ratio>,

    /// Share of a part-time creator's approved deposits owed as their
    /// commission, accrued as a fund liability.
    #[serde(default = "default_part_time_rate")]
    pub part_time_salary_rate: Ratio,

    /// Reason tag marking an expense entry as a salary payout.
    #[serde(default = "default_salary_tag")]
    pub salary_payout_tag: String,

    /// Reason tag marking an advance as settled in cash.
    #[serde(default = "default_repaid_tag")]
    pub advance_repaid_tag: String,
}

fn default_lead_source() -> String {
    "MKT".to_string()
}

fn default_penalty_rate() -> Ratio {
    0.03
}

fn default_part_time_rate() -> Ratio {
    0.30
}

fn default_salary_tag() -> String {
    "[salary]".to_string()
}

fn default_repaid_tag() -> String {
    "[repaid]".to_string()
}

impl Default for FundConfig {
    fn default() -> Self {
        Self {
            lead_source_filter: default_lead_source(),
            default_penalty_rate: default_penalty_rate(),
            penalty_rate_overrides: HashMap::new(),
            part_time_salary_rate: default_part_time_rate(),
            salary_payout_tag: default_salary_tag(),
            advance_repaid_tag: default_repaid_tag(),
        }
    }
}

impl FundConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: FundConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Whether a customer source participates in the shared fund.
    pub fn source_matches(&self, source: Option<&str>) -> bool {
        source
            .map(|s| {
                s.to_uppercase()
                    .contains(&self.lead_source_filter.to_uppercase())
            })
            .unwrap_or(false)
    }

    /// Effective penalty rate for one employee: override, else default.
    pub fn penalty_rate_for(&self, user_id: &str) -> Ratio {
        self.penalty_rate_overrides
            .get(user_id)
            .copied()
            .unwrap_or(self.default_penalty_rate)
    }

    /// Whether an expense entry's reason marks it as a salary payout.
    pub fn is_salary_payout(&self, reason: &str) -> bool {
        reason.contains(&self.salary_payout_tag)
    }
}
