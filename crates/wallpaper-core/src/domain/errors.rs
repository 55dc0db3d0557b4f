//! Errors - エラー型と分類
//!
//! - `FetchError`: 取得失敗（リモート到達不可・非 2xx・マーカー要素なし）
//! - `PersistenceError`: ledger ファイルの読み書き失敗・破損
//! - `DataIntegrityError`: 保存済み record の `date` が欠落または不正
//!
//! `PersistenceError` と `DataIntegrityError` は常に致命的。
//! 壊れた状態を「修復」したり黙って捨てたりはしない。

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The payload could not be obtained from the remote page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("unexpected http status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("payload element not found (selector: {selector})")]
    MarkerMissing { selector: String },

    #[error("payload is not a JSON object: {0}")]
    InvalidPayload(String),

    #[error("payload has no `id` field")]
    MissingId,

    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: Box<FetchError> },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cannot read ledger {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ledger {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("cannot write ledger {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot encode ledger: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A stored record whose `date` cannot take part in window filtering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataIntegrityError {
    #[error("record #{index} has no `date` field")]
    MissingDate { index: usize },

    #[error("record #{index} has invalid date {value:?}")]
    InvalidDate { index: usize, value: String },
}

/// Everything that can end a collection run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("date arithmetic out of range")]
    DateOutOfRange,
}

impl RunError {
    /// Fetch failures leave the ledger untouched and get their own exit status.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, RunError::Fetch(_))
    }
}
