//! 第1パス: セルの分類
//!
//! 手法セルは BKS と最適性シグナル、ギャップセルは差分の符号と p 値で分類する。
//! レイアウトとは独立しているので単体で検証できる。

use serde::Serialize;

use crate::aggregate::MethodResult;
use crate::compare::{GapTier, Thresholds};
use crate::pipeline::Table;
use crate::types::Instance;

/// BKS との比較結果
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BestTier {
    #[default]
    None,
    /// BKS と同点
    AtKnownBest,
    /// BKS を更新（最小化なので厳密に小さい）
    NewBest,
}

/// 手法セル（best 列）の分類。`proven_optimal` は BKS 分類と独立に付く。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MethodMark {
    pub best: BestTier,
    pub proven_optimal: bool,
}

impl MethodMark {
    pub fn classify(result: &MethodResult, instance: &Instance) -> Self {
        let bks = instance.best_known_score;
        let best = if result.result.beats(bks) {
            BestTier::NewBest
        } else if result.result.ties(bks) {
            BestTier::AtKnownBest
        } else {
            BestTier::None
        };
        MethodMark { best, proven_optimal: result.proven_optimal }
    }

    /// フッター `nb total best` に数えるか
    pub fn is_best_or_better(&self) -> bool {
        self.best != BestTier::None
    }

    pub fn is_marked(&self) -> bool {
        self.is_best_or_better() || self.proven_optimal
    }
}

/// 全セルの分類結果。添字は `[instance][method]` と `[instance][gap]`。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub marks: Vec<Vec<MethodMark>>,
    pub gaps: Vec<Vec<GapTier>>,
}

pub fn classify(table: &Table, thresholds: &Thresholds) -> Classification {
    let marks = table
        .rows
        .iter()
        .map(|row| row.methods.iter().map(|m| MethodMark::classify(m, &row.instance)).collect())
        .collect();
    let gaps = table
        .rows
        .iter()
        .map(|row| row.gaps.iter().map(|g| GapTier::classify(g, thresholds)).collect())
        .collect();
    Classification { marks, gaps }
}
