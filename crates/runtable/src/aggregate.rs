//! (instance, method) ごとの試行集合の要約

use crate::types::{FinalResult, RunSet, Summary};

/// 10進で小数 `places` 桁に丸める。
///
/// 2進値の正確な10進展開に対して丸め、ちょうど中間の場合は偶数側に寄せる。
/// 表示値と後段の差分計算はすべてこの丸め後の値を使う。
pub fn round_decimal(x: f64, places: usize) -> f64 {
    if !x.is_finite() {
        return x;
    }
    format!("{x:.places$}").parse().unwrap_or(x)
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len() as f64;
    values.sum::<f64>() / n
}

/// 試行集合を要約する。
///
/// スコアは最小化。ファイルが無い（`NoData`）か試行が0件なら `FinalResult::NoData`。
pub fn aggregate(runs: &RunSet) -> FinalResult {
    let records = match runs {
        RunSet::Runs(records) if !records.is_empty() => records,
        _ => return FinalResult::NoData,
    };

    let best = records.iter().map(|r| r.score).min().unwrap_or(i64::MAX);
    let at_best: Vec<f64> =
        records.iter().filter(|r| r.score == best).map(|r| r.time as f64).collect();

    FinalResult::Summary(Summary {
        best,
        average: round_decimal(mean(records.iter().map(|r| r.score as f64)), 1),
        mean_time_at_best: round_decimal(mean(at_best.iter().copied()), 1),
        count_achieving_best: at_best.len(),
        total_runs: records.len(),
    })
}

/// いずれかの試行が探索空間を列挙し尽くしていれば true。
///
/// スコアや時刻とは独立に判定する。カウンタを報告しない手法は常に false。
pub fn optimality_signal(runs: &RunSet) -> bool {
    runs.records().iter().filter_map(|r| r.exhaustion).any(|c| c.is_exhausted())
}

/// 生の試行集合と、そこから導出した集計結果・最適性シグナルの組
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResult {
    pub runs: RunSet,
    pub result: FinalResult,
    pub proven_optimal: bool,
}

impl MethodResult {
    pub fn from_runs(runs: RunSet) -> Self {
        let result = aggregate(&runs);
        let proven_optimal = optimality_signal(&runs);
        MethodResult { runs, result, proven_optimal }
    }
}
