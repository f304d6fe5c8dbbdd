//! グリッドの書き出し
//!
//! 形式は出力パスの拡張子から決める（`.gz` は外して判定）。

mod delimited;
mod html;
mod json;
mod text;

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::io::open_writer;
use crate::error::{ReportError, Result};
use crate::grid::Grid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
    Csv,
    Text,
}

impl ReportFormat {
    /// 拡張子から推定する。未知の拡張子はテキスト。
    pub fn from_path(path: &Path) -> Self {
        let mut p = path;
        if p.extension().is_some_and(|e| e.eq_ignore_ascii_case("gz")) {
            p = Path::new(p.file_stem().unwrap_or_default());
        }
        let ext = p.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("html" | "htm") => ReportFormat::Html,
            Some("json") => ReportFormat::Json,
            Some("csv") => ReportFormat::Csv,
            _ => ReportFormat::Text,
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "text" | "txt" => Ok(ReportFormat::Text),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Text => "text",
        };
        f.write_str(s)
    }
}

/// 任意の `Write` へ書き出す
pub fn render<W: Write>(grid: &Grid, format: ReportFormat, w: &mut W) -> io::Result<()> {
    match format {
        ReportFormat::Html => html::render(grid, w),
        ReportFormat::Json => json::render(grid, w),
        ReportFormat::Csv => delimited::render(grid, w),
        ReportFormat::Text => text::render(grid, w),
    }
}

pub fn render_to_string(grid: &Grid, format: ReportFormat) -> io::Result<String> {
    let mut buf = Vec::new();
    render(grid, format, &mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// ファイル（`-` なら標準出力）へ書き出す
pub fn write_report(grid: &Grid, format: ReportFormat, path: &Path) -> Result<()> {
    let mut w = open_writer(path).map_err(|e| ReportError::io(path, e))?;
    render(grid, format, &mut w).map_err(|e| ReportError::io(path, e))?;
    w.close().map_err(|e| ReportError::io(path, e))?;
    log::info!("wrote {format} report to {}", path.display());
    Ok(())
}
