//! レポート生成で発生するエラー型

use std::path::PathBuf;

/// 集計・レポート生成のエラー
///
/// どのバリアントも致命的で、部分的なレポートは出力しない。
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// ファイル I/O エラー
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV の構造エラー（列数不一致、不正な UTF-8 など）
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// 参照テーブルに存在しないインスタンス
    #[error("instance {name} not found in {}", table.display())]
    UnknownInstance { name: String, table: PathBuf },

    /// 参照テーブルの行が壊れている
    #[error("{}:{line}: {reason}", path.display())]
    MalformedTable { path: PathBuf, line: usize, reason: String },

    /// 試行結果ファイルの最終行が壊れている（上流の出力破損）
    #[error(
        "malformed run file {} (instance {instance}, method {method}): {reason}",
        path.display()
    )]
    MalformedRun { instance: String, method: String, path: PathBuf, reason: String },

    /// 設定ファイルの構文エラー
    #[error("failed to parse config {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// 設定内容の矛盾
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// ファイル名パターンの構築失敗
    #[error("invalid file pattern {pattern}: {reason}")]
    Pattern { pattern: String, reason: String },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io { path: path.into(), source }
    }
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
