//! Calendar windows for KPI evaluation and period filtering.
//!
//! Timestamps are stored in UTC; every date bucket (month, quarter, year,
//! period range) is taken in the dealership's local zone, a fixed UTC+7.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const LOCAL_OFFSET_SECS: i32 = 7 * 3600;

/// A UTC timestamp's calendar date in the dealership's zone.
pub fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    let offset = FixedOffset::east_opt(LOCAL_OFFSET_SECS).expect("fixed offset in range");
    ts.with_timezone(&offset).date_naive()
}

/// The time window a settlement run is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarSelection {
    Month { month: u32, year: i32 },
    Quarter { quarter: u32, year: i32 },
    Year { year: i32 },
    /// No time filter at all. KPI targets resolve to zero in this mode —
    /// a monthly target has no meaning over an unbounded window.
    All,
}

impl CalendarSelection {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let date = local_date(ts);
        match *self {
            Self::Month { month, year } => date.month() == month && date.year() == year,
            Self::Quarter { quarter, year } => {
                date.year() == year && quarter_of(date.month()) == quarter
            }
            Self::Year { year } => date.year() == year,
            Self::All => true,
        }
    }

    /// The (month, year) pairs covered, used to sum per-month KPI targets.
    /// Empty for `All`.
    pub fn months(&self) -> Vec<(u32, i32)> {
        match *self {
            Self::Month { month, year } => vec![(month, year)],
            Self::Quarter { quarter, year } => {
                let first = (quarter - 1) * 3 + 1;
                (first..first + 3).map(|m| (m, year)).collect()
            }
            Self::Year { year } => (1..=12).map(|m| (m, year)).collect(),
            Self::All => Vec::new(),
        }
    }
}

fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}
