//! wallpaper-core
//!
//! Core building blocks for the daily wallpaper collector: fetch one
//! randomly chosen wallpaper, file it under a date a week ahead, and keep a
//! rolling window of those entries in a JSON ledger.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（record, dates, dedup, ledger, retry, errors）
//! - **ports**: 抽象化レイヤー（PayloadSource, LedgerStore, Clock, Sleeper）
//! - **impls**: 実装（HTTP 取得, JSON ファイル, InMemory）
//! - **app**: アプリケーションロジック（config, builder, runner）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
