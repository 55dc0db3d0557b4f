//! PayloadSource port - 「今日の壁紙」ペイロードの取得
//!
//! 実装は URL を設定で受け取り、1 件の [`Record`] を返すか失敗する。
//! リトライ方針はアダプタ側の性質であり、コアには持ち込まない
//! （[`RetryingSource`](crate::impls::RetryingSource) で包む）。
//!
//! # 実装
//! - **HttpPayloadSource**: 直接 HTTP GET
//! - **StaticPayloadSource**: テスト用

use async_trait::async_trait;

use crate::domain::{FetchError, Record};

/// PayloadSource は `id` を含む record を 1 件返す
///
/// # 契約
/// - 成功時の record は必ず `id` フィールドを持つ
/// - 取得できなければ `FetchError`
#[async_trait]
pub trait PayloadSource: Send + Sync {
    async fn fetch(&self) -> Result<Record, FetchError>;
}
