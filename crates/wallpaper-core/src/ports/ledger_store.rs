//! LedgerStore port - ledger の永続化
//!
//! ledger は毎回まるごと読み、まるごと書き戻す（追記・部分更新なし）。
//! ロックは持たない。同時実行の排他は呼び出し側スケジューラの責任。
//!
//! # 実装
//! - **JsonFileLedgerStore**: JSON ファイル（一時ファイル + rename で原子的に置換）
//! - **InMemoryLedgerStore**: テスト用

use crate::domain::{Ledger, PersistenceError};

pub trait LedgerStore: Send + Sync {
    /// 永続化された ledger を読む。まだ存在しなければ空の ledger（初回起動）。
    fn load(&self) -> Result<Ledger, PersistenceError>;

    /// ledger 全体を原子的に書き込み、以前の状態を置き換える。
    fn save(&self, ledger: &Ledger) -> Result<(), PersistenceError>;
}
