//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部（リモートページ・ファイルシステム・壁時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod clock;
pub mod ledger_store;
pub mod payload_source;
pub mod sleeper;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::ledger_store::LedgerStore;
pub use self::payload_source::PayloadSource;
pub use self::sleeper::{Sleeper, TokioSleeper};
