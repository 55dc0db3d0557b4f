//! Domain model (records, dates, ledger rules, retry rules, errors).
//!
//! ここにある型は I/O を一切しない。ネットワーク・ファイル・時計は ports 経由。

pub mod dates;
pub mod dedup;
pub mod errors;
pub mod ledger;
pub mod record;
pub mod retry;

pub use dates::{DateWindow, RunDates, Schedule};
pub use dedup::{DateOnly, DedupKey, DedupPolicy, IdAndDate};
pub use errors::{DataIntegrityError, FetchError, PersistenceError, RunError};
pub use ledger::{Ledger, MergeOutcome};
pub use record::{DateCode, Record};
pub use retry::{RetryDecision, RetryPolicy};
