//! Dedup policy: decides whether a freshly fetched record is already in the
//! ledger.
//!
//! Two keys are supported and they are mutually incompatible:
//! - [`DateOnly`]: one record per scheduled date. A later run that draws a
//!   different wallpaper for an already filled date is a no-op.
//! - [`IdAndDate`]: one record per (`id`, `date`). Re-rolls on the same day
//!   accumulate several wallpapers for one scheduled date.

use serde::{Deserialize, Serialize};

use super::record::Record;

/// Pure predicate over two records; no side effects.
pub trait DedupPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `true` when `existing` already represents `candidate`.
    fn is_duplicate(&self, existing: &Record, candidate: &Record) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateOnly;

impl DedupPolicy for DateOnly {
    fn name(&self) -> &'static str {
        "date"
    }

    fn is_duplicate(&self, existing: &Record, candidate: &Record) -> bool {
        match (existing.date_str(), candidate.date_str()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdAndDate;

impl DedupPolicy for IdAndDate {
    fn name(&self) -> &'static str {
        "id_date"
    }

    fn is_duplicate(&self, existing: &Record, candidate: &Record) -> bool {
        DateOnly.is_duplicate(existing, candidate)
            && matches!((existing.id(), candidate.id()), (Some(a), Some(b)) if a == b)
    }
}

/// Configuration-level selector for a [`DedupPolicy`].
///
/// The key only guards new merges. A ledger written under `IdDate` may hold
/// several records for one date; switching it to `Date` keeps those records
/// and only stops further ones for that date. They age out with the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    #[default]
    Date,
    IdDate,
}

impl DedupKey {
    pub fn policy(self) -> Box<dyn DedupPolicy> {
        match self {
            DedupKey::Date => Box::new(DateOnly),
            DedupKey::IdDate => Box::new(IdAndDate),
        }
    }
}
