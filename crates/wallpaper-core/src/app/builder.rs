//! JobBuilder - 収集ジョブの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: 必須の port が欠けていれば build() が失敗する
//! - テストでは port を差し替え、本番では [`JobBuilder::production`] で一括構築

use crate::app::config::{ConfigError, JobConfig};
use crate::app::runner::CollectJob;
use crate::domain::{DedupKey, FetchError, Schedule};
use crate::impls::{HttpPayloadSource, JsonFileLedgerStore, RetryingSource};
use crate::ports::{Clock, LedgerStore, PayloadSource, SystemClock, TokioSleeper};

/// JobBuilder は CollectJob を構築
///
/// # 使用例
/// ```ignore
/// let job = JobBuilder::new(schedule)
///     .source(StaticPayloadSource::returning(record))
///     .store(InMemoryLedgerStore::new())
///     .clock(FixedClock::new(now))
///     .build()?;
/// ```
pub struct JobBuilder {
    schedule: Schedule,
    dedup: DedupKey,
    source: Option<Box<dyn PayloadSource>>,
    store: Option<Box<dyn LedgerStore>>,
    clock: Option<Box<dyn Clock>>,
}

/// BuildError はジョブ構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing components: {0:?}")]
    Missing(Vec<&'static str>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot create payload source: {0}")]
    Source(#[from] FetchError),
}

impl JobBuilder {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            dedup: DedupKey::default(),
            source: None,
            store: None,
            clock: None,
        }
    }

    /// schedule と dedup だけを設定から読み込む（port は未設定）
    pub fn from_config(config: &JobConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let schedule = Schedule {
            utc_offset: config.utc_offset()?,
            lookahead_days: config.lookahead_days,
            retention_days: config.retention_days,
        };
        Ok(Self::new(schedule).dedup(config.dedup))
    }

    /// 本番用ワイヤリング: HTTP 取得 + リトライ + JSON ファイル + 壁時計
    pub fn production(config: &JobConfig) -> Result<Self, BuildError> {
        let http = HttpPayloadSource::new(
            config.target_url.clone(),
            config.marker.clone(),
            config.http.timeout(),
            &config.http.user_agent,
        )?;
        let source = RetryingSource::new(http, config.retry.policy(), TokioSleeper);

        Ok(Self::from_config(config)?
            .source(source)
            .store(JsonFileLedgerStore::new(config.ledger_path.clone()))
            .clock(SystemClock))
    }

    pub fn dedup(mut self, key: DedupKey) -> Self {
        self.dedup = key;
        self
    }

    pub fn source(mut self, source: impl PayloadSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn store(mut self, store: impl LedgerStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// # 検証
    /// - source と store は必須（不足があれば BuildError::Missing）
    /// - clock は省略時 SystemClock
    pub fn build(self) -> Result<CollectJob, BuildError> {
        let mut missing = Vec::new();
        if self.source.is_none() {
            missing.push("source");
        }
        if self.store.is_none() {
            missing.push("store");
        }
        let (Some(source), Some(store)) = (self.source, self.store) else {
            return Err(BuildError::Missing(missing));
        };

        Ok(CollectJob::new(
            source,
            store,
            self.clock
                .unwrap_or_else(|| Box::new(SystemClock) as Box<dyn Clock>),
            self.dedup.policy(),
            self.schedule,
        ))
    }
}
