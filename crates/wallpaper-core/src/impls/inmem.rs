//! InMemory 実装 - テスト・開発用の ledger ストアとペイロード源
//!
//! # 学習ポイント
//! - `Mutex` で `&self` から状態を書き換える（LedgerStore は `&self` を取る）
//! - 書き込み回数を数えて「失敗時に保存していない」ことを検証できる

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::{FetchError, Ledger, PersistenceError, Record};
use crate::ports::{LedgerStore, PayloadSource};

/// InMemoryLedgerStore は ledger をメモリ上に保持する
///
/// `None` は「まだ保存されたことがない」（初回起動）を表す。
#[derive(Default)]
pub struct InMemoryLedgerStore {
    ledger: Mutex<Option<Ledger>>,
    saves: Mutex<u32>,
    fail_saves: bool,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(Some(ledger)),
            ..Self::default()
        }
    }

    /// save() が常に書き込みエラーを返すストア
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// 現在保持している ledger（一度も保存されていなければ None）
    pub fn snapshot(&self) -> Option<Ledger> {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn save_count(&self) -> u32 {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self) -> Result<Ledger, PersistenceError> {
        Ok(self.snapshot().unwrap_or_default())
    }

    fn save(&self, ledger: &Ledger) -> Result<(), PersistenceError> {
        if self.fail_saves {
            return Err(PersistenceError::Write {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::other("save disabled"),
            });
        }
        *self.ledger.lock().unwrap_or_else(PoisonError::into_inner) = Some(ledger.clone());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

/// StaticPayloadSource は毎回同じ結果を返す
pub struct StaticPayloadSource {
    outcome: Result<Record, String>,
}

impl StaticPayloadSource {
    pub fn returning(record: Record) -> Self {
        Self {
            outcome: Ok(record),
        }
    }

    /// 毎回 `FetchError::Network(message)` で失敗する
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

#[async_trait]
impl PayloadSource for StaticPayloadSource {
    async fn fetch(&self) -> Result<Record, FetchError> {
        self.outcome.clone().map_err(FetchError::Network)
    }
}
