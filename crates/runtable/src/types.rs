//! 集計対象のエンティティ型

use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 手法（ヒューリスティック）の定義
///
/// 同一性は `id` のみで決まる。`root` や `display_name` が違っても
/// `id` が同じなら同じ手法として扱う。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    pub id: String,
    /// 試行結果 CSV が置かれたディレクトリ
    pub root: PathBuf,
    /// ヘッダー表示名
    pub display_name: String,
}

impl Method {
    pub fn new(
        id: impl Into<String>,
        root: impl Into<PathBuf>,
        display_name: impl Into<String>,
    ) -> Self {
        Method { id: id.into(), root: root.into(), display_name: display_name.into() }
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// ベンチマークインスタンスの静的メタデータ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub vertex_count: u64,
    pub edge_count: u64,
    /// 既知最良スコア（BKS）
    pub best_known_score: i64,
    /// BKS が最適性証明済みか
    pub is_known_optimal: bool,
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Instance {}

/// 探索空間の網羅状況カウンタ（MCTS 系の手法のみ出力する）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhaustionCounters {
    /// `nb total node`
    pub total_explored: i64,
    /// `nb current node`
    pub remaining_to_explore: i64,
}

impl ExhaustionCounters {
    /// 探索木を列挙し尽くしたか
    pub fn is_exhausted(&self) -> bool {
        self.total_explored > 1 && self.remaining_to_explore <= 1
    }
}

/// 1試行の最終状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// 最良スコアに到達した時刻（秒）
    pub time: i64,
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhaustion: Option<ExhaustionCounters>,
}

impl RunRecord {
    pub fn new(time: i64, score: i64) -> Self {
        RunRecord { time, score, exhaustion: None }
    }
}

/// (instance, method) ごとの試行集合
///
/// `NoData` は結果ファイルが1つも無い状態で、空の `Runs` とは区別する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunSet {
    NoData,
    Runs(Vec<RunRecord>),
}

impl RunSet {
    /// 検定に渡すスコア列。`NoData` は空列として扱う。
    pub fn scores(&self) -> Vec<f64> {
        match self {
            RunSet::NoData => Vec::new(),
            RunSet::Runs(runs) => runs.iter().map(|r| r.score as f64).collect(),
        }
    }

    pub fn records(&self) -> &[RunRecord] {
        match self {
            RunSet::NoData => &[],
            RunSet::Runs(runs) => runs,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, RunSet::NoData)
    }
}

/// 試行集合から導出した要約値
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub best: i64,
    /// 小数第1位に丸めた平均スコア
    pub average: f64,
    /// best を達成した試行の平均時刻（小数第1位に丸め）
    pub mean_time_at_best: f64,
    pub count_achieving_best: usize,
    pub total_runs: usize,
}

/// (instance, method) の集計結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinalResult {
    NoData,
    Summary(Summary),
}

impl FinalResult {
    pub fn summary(&self) -> Option<&Summary> {
        match self {
            FinalResult::NoData => None,
            FinalResult::Summary(s) => Some(s),
        }
    }

    pub fn best(&self) -> Option<i64> {
        self.summary().map(|s| s.best)
    }

    pub fn average(&self) -> Option<f64> {
        self.summary().map(|s| s.average)
    }

    pub fn count_achieving_best(&self) -> usize {
        self.summary().map_or(0, |s| s.count_achieving_best)
    }

    pub fn total_runs(&self) -> usize {
        self.summary().map_or(0, |s| s.total_runs)
    }

    /// 最小化問題として `score` より厳密に良いか。`NoData` は常に最悪。
    pub fn beats(&self, score: i64) -> bool {
        self.best().is_some_and(|b| b < score)
    }

    /// `score` と同点か。`NoData` は決して同点にならない。
    pub fn ties(&self, score: i64) -> bool {
        self.best() == Some(score)
    }
}

/// 2手法間の平均差と有意確率
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// `avg(A) - avg(B)`（丸め済み平均同士の差、小数第1位）
    pub difference: Option<f64>,
    /// 両側 p 値（小数第3位）。検定不能なら `None`
    pub p_value: Option<f64>,
}

/// 比較する手法の順序付きペア（`first` が A）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GapPair {
    pub first: String,
    pub second: String,
}

impl GapPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        GapPair { first: first.into(), second: second.into() }
    }

    /// 手法の並び順に全ての非順序ペアを列挙する
    pub fn all_pairs(methods: &[Method]) -> Vec<GapPair> {
        let mut pairs = Vec::new();
        for (i, a) in methods.iter().enumerate() {
            for b in &methods[i + 1..] {
                pairs.push(GapPair::new(a.id.clone(), b.id.clone()));
            }
        }
        pairs
    }
}
