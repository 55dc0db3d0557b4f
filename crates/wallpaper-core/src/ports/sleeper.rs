//! Sleeper port - 待機の抽象化
//!
//! リトライ間の待機を差し替え可能にする。テストでは実際には眠らず、
//! 要求された待機時間だけを記録する。

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// tokio のタイマーで実際に待つ
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
