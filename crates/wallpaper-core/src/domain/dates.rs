//! Date calculator: "today" in a fixed civil timezone and the dates derived
//! from it.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use super::record::DateCode;

/// Closed interval `[min, max]` of dates a ledger may hold after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }
}

/// Where "today" is read and how far the window reaches on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub utc_offset: FixedOffset,
    pub lookahead_days: u32,
    pub retention_days: u32,
}

impl Schedule {
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<RunDates> {
        RunDates::resolve(now, self.utc_offset, self.lookahead_days, self.retention_days)
    }
}

/// Dates computed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDates {
    pub today: NaiveDate,
    pub effective_date: DateCode,
    pub window: DateWindow,
}

impl RunDates {
    /// Resolve the civil date of `now` at `offset` and derive the run dates.
    ///
    /// Returns `None` only when the arithmetic leaves chrono's date range.
    pub fn resolve(
        now: DateTime<Utc>,
        offset: FixedOffset,
        lookahead_days: u32,
        retention_days: u32,
    ) -> Option<Self> {
        let today = now.with_timezone(&offset).date_naive();
        Self::from_today(today, lookahead_days, retention_days)
    }

    pub fn from_today(today: NaiveDate, lookahead_days: u32, retention_days: u32) -> Option<Self> {
        let effective = today.checked_add_days(Days::new(u64::from(lookahead_days)))?;
        let min = today.checked_sub_days(Days::new(u64::from(retention_days)))?;
        Some(Self {
            today,
            effective_date: DateCode::new(effective),
            window: DateWindow {
                min,
                max: effective,
            },
        })
    }
}
