//! Ledger: the full ordered sequence of records kept between runs.
//!
//! A run reads the whole ledger, applies merge -> prune -> sort in memory and
//! writes the whole ledger back. After a successful run:
//! - every `date` lies inside the run's [`DateWindow`]
//! - no two records share a dedup key
//! - records are sorted ascending by `date`

use serde::{Deserialize, Serialize};

use super::dates::DateWindow;
use super::dedup::DedupPolicy;
use super::errors::DataIntegrityError;
use super::record::{DateCode, Record};

/// Result of [`Ledger::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    /// An existing record already covers the candidate's dedup key.
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    records: Vec<Record>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append `record` unless `policy` finds it already present.
    ///
    /// Existing records are never collapsed, so a ledger built under a looser
    /// policy keeps its extra same-date entries.
    pub fn merge(&mut self, record: Record, policy: &dyn DedupPolicy) -> MergeOutcome {
        if self
            .records
            .iter()
            .any(|existing| policy.is_duplicate(existing, &record))
        {
            return MergeOutcome::AlreadyPresent;
        }
        self.records.push(record);
        MergeOutcome::Inserted
    }

    /// Keep only records dated inside `window`; returns how many were dropped.
    ///
    /// Fails without touching the ledger if any record has a missing or
    /// invalid `date`: corrupt history is never dropped silently.
    pub fn prune(&mut self, window: &DateWindow) -> Result<usize, DataIntegrityError> {
        let dates = self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| record_date(index, record))
            .collect::<Result<Vec<_>, _>>()?;

        let before = self.records.len();
        let mut dates = dates.into_iter();
        self.records.retain(|_| {
            dates
                .next()
                .is_some_and(|date| window.contains(date.date()))
        });
        Ok(before - self.records.len())
    }

    /// Stable ascending sort by `date`.
    pub fn sort(&mut self) {
        self.records
            .sort_by(|a, b| a.date_str().unwrap_or("").cmp(b.date_str().unwrap_or("")));
    }
}

fn record_date(index: usize, record: &Record) -> Result<DateCode, DataIntegrityError> {
    if !record.has_date() {
        return Err(DataIntegrityError::MissingDate { index });
    }
    let raw = record.date_str().ok_or_else(|| DataIntegrityError::InvalidDate {
        index,
        value: record
            .get(super::record::DATE_FIELD)
            .map(ToString::to_string)
            .unwrap_or_default(),
    })?;
    raw.parse().map_err(|_| DataIntegrityError::InvalidDate {
        index,
        value: raw.to_string(),
    })
}
