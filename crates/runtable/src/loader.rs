//! 試行結果 CSV の読み込み
//!
//! 1試行 = 1ファイル `<root>/<instance>_<trial>.csv`。最適化器は改善のたびに
//! 行を追記するので、最終行だけが試行の最終状態を表す。

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::common::io::open_reader;
use crate::error::{ReportError, Result};
use crate::types::{ExhaustionCounters, Method, RunRecord, RunSet};

const COL_TIME: &str = "time";
const COL_SCORE: &str = "score";
const COL_TOTAL_NODE: &str = "nb total node";
const COL_CURRENT_NODE: &str = "nb current node";

/// `root` 直下にある `instance` の試行ファイルを試行番号の昇順で列挙する。
///
/// 番号は辞書順ではなく数値で比較する（`_10` は `_9` の後）。
/// ファイル名は完全一致で判定するため、`queen10` が `queen10_10_4.csv` を拾うことはない。
pub fn trial_files(root: &Path, instance: &str) -> Result<Vec<(u64, PathBuf)>> {
    let pattern = PathBuf::from(glob::Pattern::escape(&root.to_string_lossy()))
        .join(format!("{}_*.csv", glob::Pattern::escape(instance)));
    let pattern = pattern.to_string_lossy().into_owned();
    let name_src = format!(r"^{}_(\d+)\.csv$", regex::escape(instance));
    let name_re = Regex::new(&name_src).map_err(|e| ReportError::Pattern {
        pattern: instance.to_owned(),
        reason: e.to_string(),
    })?;

    let entries = glob::glob(&pattern).map_err(|e| ReportError::Pattern {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            ReportError::io(path, e.into())
        })?;
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(caps) = name_re.captures(name) else {
            continue;
        };
        match caps[1].parse::<u64>() {
            Ok(idx) => files.push((idx, path)),
            Err(_) => log::warn!("trial index out of range, skipped: {}", path.display()),
        }
    }
    files.sort();
    Ok(files)
}

/// 手法 `method` のインスタンス `instance` に対する全試行を読む。
///
/// ファイルが1つも無ければ `RunSet::NoData`。ファイルがあるのに最終行が
/// 読めない場合は致命的エラーとする。
pub fn load_runs(method: &Method, instance: &str) -> Result<RunSet> {
    let files = trial_files(&method.root, instance)?;
    if files.is_empty() {
        log::debug!("no result files for {instance} in {}", method.root.display());
        return Ok(RunSet::NoData);
    }
    let mut runs = Vec::with_capacity(files.len());
    for (_, path) in &files {
        runs.push(read_terminal_row(path, instance, &method.id)?);
    }
    log::debug!("{instance}/{}: {} trials", method.id, runs.len());
    Ok(RunSet::Runs(runs))
}

/// 結果ファイルの最終行から `RunRecord` を作る。
pub fn read_terminal_row(path: &Path, instance: &str, method: &str) -> Result<RunRecord> {
    let malformed = |reason: String| ReportError::MalformedRun {
        instance: instance.to_owned(),
        method: method.to_owned(),
        path: path.to_path_buf(),
        reason,
    };
    let csv_err = |source: csv::Error| ReportError::Csv { path: path.to_path_buf(), source };

    let reader = open_reader(path).map_err(|e| ReportError::io(path, e))?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let time_idx =
        column(COL_TIME).ok_or_else(|| malformed(format!("missing column `{COL_TIME}`")))?;
    let score_idx =
        column(COL_SCORE).ok_or_else(|| malformed(format!("missing column `{COL_SCORE}`")))?;
    let counter_idx = column(COL_TOTAL_NODE).zip(column(COL_CURRENT_NODE));

    let mut last = None;
    for record in rdr.records() {
        last = Some(record.map_err(csv_err)?);
    }
    let last = last.ok_or_else(|| malformed("no data row".to_owned()))?;

    let field = |idx: usize, name: &str| -> Result<i64> {
        let raw = last.get(idx).ok_or_else(|| malformed(format!("terminal row lacks `{name}`")))?;
        coerce_int(raw).ok_or_else(|| malformed(format!("non-numeric `{name}`: {raw:?}")))
    };
    let time = field(time_idx, COL_TIME)?;
    let score = field(score_idx, COL_SCORE)?;
    if time < 0 {
        return Err(malformed(format!("negative `{COL_TIME}`: {time}")));
    }

    // カウンタ列は MCTS 系のみが出す。読めなければ未報告扱い
    let exhaustion = counter_idx.and_then(|(total_idx, current_idx)| {
        let total = last.get(total_idx).and_then(coerce_int);
        let current = last.get(current_idx).and_then(coerce_int);
        match (total, current) {
            (Some(total_explored), Some(remaining_to_explore)) => Some(ExhaustionCounters {
                total_explored,
                remaining_to_explore,
            }),
            _ => {
                log::warn!("unreadable exploration counters ignored: {}", path.display());
                None
            }
        }
    });

    Ok(RunRecord { time, score, exhaustion })
}

/// 整数へ変換する。小数表記は 0 方向に切り捨てる。
fn coerce_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if !f.is_finite() {
        return None;
    }
    let t = f.trunc();
    if t < i64::MIN as f64 || t >= i64::MAX as f64 {
        return None;
    }
    Some(t as i64)
}
