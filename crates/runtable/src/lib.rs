//! # runtable
//!
//! ベンチマーク試行結果の集計・比較レポート生成ライブラリ。
//!
//! ## モジュール構成
//!
//! - `types`: 基本型（Method, Instance, RunRecord, FinalResult, Gap）
//! - `loader`: 試行ごとの CSV 読み込み
//! - `catalog`: インスタンス情報と BKS の表
//! - `aggregate`: 試行集合の要約
//! - `ttest` / `compare`: 2標本 t 検定と手法ペアの比較
//! - `pipeline`: 読み込みから比較までの一括処理
//! - `grid`: レポートグリッドの組み立て
//! - `render`: グリッドの書き出し（HTML / JSON / CSV / テキスト）
//! - `config`: 設定ファイルと CLI 引数のマージ

pub mod aggregate;
pub mod catalog;
pub mod common;
pub mod compare;
pub mod config;
pub mod error;
pub mod grid;
pub mod loader;
pub mod pipeline;
pub mod render;
pub mod ttest;
pub mod types;

pub use error::{ReportError, Result};
pub use grid::{Grid, LayoutOptions, Report, build_grid, build_report};
pub use pipeline::Table;
pub use render::{ReportFormat, write_report};
