//! 第2パス: フッター用の集計
//!
//! 勝敗は最も厳しい有意水準（`Strength::Strong`）を満たしたギャップだけを数え、
//! ペアの勝った側に better、負けた側に worse として振り分ける。

use serde::Serialize;

use super::classify::Classification;
use crate::pipeline::Table;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MethodTally {
    /// BKS 以上の best を出したインスタンス数
    pub best: usize,
    /// 最適性シグナルが立ったインスタンス数
    pub optimal: usize,
    /// 有意に良かった回数（全ペア合計）
    pub better: usize,
    /// 有意に悪かった回数（全ペア合計）
    pub worse: usize,
}

impl MethodTally {
    /// better / worse。worse が 0 なら `None`
    pub fn ratio(&self) -> Option<f64> {
        if self.worse == 0 { None } else { Some(self.better as f64 / self.worse as f64) }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GapTally {
    /// 1番目の手法が有意に良かったインスタンス数
    pub first_wins: usize,
    /// 2番目の手法が有意に良かったインスタンス数
    pub second_wins: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tallies {
    pub instances: usize,
    pub methods: Vec<MethodTally>,
    pub gaps: Vec<GapTally>,
}

pub fn tally(table: &Table, classification: &Classification) -> Tallies {
    let mut methods = vec![MethodTally::default(); table.methods.len()];
    let mut gaps = vec![GapTally::default(); table.pairs.len()];

    for marks in &classification.marks {
        for (t, mark) in methods.iter_mut().zip(marks) {
            if mark.is_best_or_better() {
                t.best += 1;
            }
            if mark.proven_optimal {
                t.optimal += 1;
            }
        }
    }

    for tiers in &classification.gaps {
        for (t, tier) in gaps.iter_mut().zip(tiers) {
            if tier.first_wins_strongly() {
                t.first_wins += 1;
            }
            if tier.second_wins_strongly() {
                t.second_wins += 1;
            }
        }
    }

    for (g, &(first, second)) in gaps.iter().zip(table.pair_indices()) {
        methods[first].better += g.first_wins;
        methods[second].worse += g.first_wins;
        methods[second].better += g.second_wins;
        methods[first].worse += g.second_wins;
    }

    Tallies { instances: table.rows.len(), methods, gaps }
}
