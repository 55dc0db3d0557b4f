//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpPayloadSource**: 直接 HTTP GET でページを取得し、マーカー要素の JSON を読む
//! - **RetryingSource**: 任意の PayloadSource を RetryPolicy で包むデコレータ
//! - **JsonFileLedgerStore**: JSON ファイルへの原子的な保存
//! - **InMemoryLedgerStore / StaticPayloadSource**: テスト・開発用

pub mod extract;
pub mod http_source;
pub mod inmem;
pub mod json_file_store;
pub mod retrying_source;

pub use self::extract::{PayloadMarker, extract_payload};
pub use self::http_source::HttpPayloadSource;
pub use self::inmem::{InMemoryLedgerStore, StaticPayloadSource};
pub use self::json_file_store::JsonFileLedgerStore;
pub use self::retrying_source::RetryingSource;
