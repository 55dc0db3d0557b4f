//! App - アプリケーション層
//!
//! ports を組み合わせて 1 回分の収集ジョブを実装します。
//!
//! # 主要コンポーネント
//! - **JobConfig**: 設定（TOML）
//! - **JobBuilder**: ジョブの構築とワイヤリング
//! - **CollectJob**: 実行（dates → fetch → merge → prune → sort → save）

pub mod builder;
pub mod config;
pub mod runner;

pub use self::builder::{BuildError, JobBuilder};
pub use self::config::{ConfigError, HttpConfig, JobConfig, RetryConfig, RetryMode};
pub use self::runner::{CollectJob, RunReport};
