//! 手法ペアの比較と有意水準の分類

use serde::{Deserialize, Serialize};

use crate::aggregate::{MethodResult, round_decimal};
use crate::error::{ReportError, Result};
use crate::ttest::{TTestKind, ttest_ind};
use crate::types::Gap;

/// 既定の有意水準（厳しい順）
pub const DEFAULT_THRESHOLDS: [f64; 3] = [0.001, 0.01, 0.05];

/// 入れ子になった3段階の有意水準
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Thresholds([f64; 3]);

impl Thresholds {
    /// 厳しい順に狭義単調増加で、すべて (0, 1] に入っていること
    pub fn new(levels: [f64; 3]) -> Result<Self> {
        let in_range = levels.iter().all(|p| *p > 0.0 && *p <= 1.0);
        let increasing = levels.windows(2).all(|w| w[0] < w[1]);
        if !in_range || !increasing {
            return Err(ReportError::InvalidConfig(format!(
                "thresholds must be strictly increasing within (0, 1]: {levels:?}"
            )));
        }
        Ok(Thresholds(levels))
    }

    pub fn levels(&self) -> [f64; 3] {
        self.0
    }

    /// 満たす中で最も厳しい水準
    pub fn strength(&self, p: f64) -> Option<Strength> {
        let [strong, moderate, weak] = self.0;
        if p <= strong {
            Some(Strength::Strong)
        } else if p <= moderate {
            Some(Strength::Moderate)
        } else if p <= weak {
            Some(Strength::Weak)
        } else {
            None
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds(DEFAULT_THRESHOLDS)
    }
}

impl TryFrom<Vec<f64>> for Thresholds {
    type Error = String;

    fn try_from(v: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        let levels: [f64; 3] =
            v.try_into().map_err(|v: Vec<f64>| format!("expected 3 thresholds, got {}", v.len()))?;
        Thresholds::new(levels).map_err(|e| e.to_string())
    }
}

impl From<Thresholds> for Vec<f64> {
    fn from(t: Thresholds) -> Self {
        t.0.to_vec()
    }
}

/// 有意の強さ。`Strong` のみがフッターの勝敗集計に数えられる。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

/// ギャップセルの7段階の分類
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tier", content = "strength", rename_all = "snake_case")]
pub enum GapTier {
    Neutral,
    /// ペアの1番目の手法の平均が小さい（良い）
    FirstBetter(Strength),
    /// ペアの2番目の手法の平均が小さい（良い）
    SecondBetter(Strength),
}

impl GapTier {
    pub fn classify(gap: &Gap, thresholds: &Thresholds) -> GapTier {
        let (Some(diff), Some(p)) = (gap.difference, gap.p_value) else {
            return GapTier::Neutral;
        };
        let Some(strength) = thresholds.strength(p) else {
            return GapTier::Neutral;
        };
        if diff < 0.0 {
            GapTier::FirstBetter(strength)
        } else if diff > 0.0 {
            GapTier::SecondBetter(strength)
        } else {
            GapTier::Neutral
        }
    }

    pub fn first_wins_strongly(&self) -> bool {
        matches!(self, GapTier::FirstBetter(Strength::Strong))
    }

    pub fn second_wins_strongly(&self) -> bool {
        matches!(self, GapTier::SecondBetter(Strength::Strong))
    }
}

/// 同じインスタンスで集計済みの2手法を比較する。
///
/// 差分は表示と同じ丸め済み平均から計算する。データの無い側は検定では
/// 空の標本として扱うので p 値は `None` になる。
pub fn compare(a: &MethodResult, b: &MethodResult, kind: TTestKind) -> Gap {
    let p = ttest_ind(&a.runs.scores(), &b.runs.scores(), kind).map(|t| t.p_value);
    let difference =
        a.result.average().zip(b.result.average()).map(|(x, y)| round_decimal(x - y, 1));
    Gap { difference, p_value: p.map(|p| round_decimal(p, 3)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RunRecord, RunSet};

    fn method(pairs: &[(i64, i64)]) -> MethodResult {
        MethodResult::from_runs(RunSet::Runs(
            pairs.iter().map(|&(t, s)| RunRecord::new(t, s)).collect(),
        ))
    }

    #[test]
    fn difference_uses_rounded_averages() {
        let a = method(&[(10, 50), (12, 52), (9, 50)]);
        let b = method(&[(20, 48), (22, 48)]);
        let gap = compare(&a, &b, TTestKind::Welch);
        assert_eq!(gap.difference, Some(2.7));
        assert_eq!(gap.p_value, Some(0.057));
    }

    #[test]
    fn reversed_pair_is_antisymmetric() {
        let a = method(&[(1, 101), (1, 104), (1, 99), (1, 100)]);
        let b = method(&[(1, 97), (1, 98), (1, 103)]);
        for kind in [TTestKind::Welch, TTestKind::Student] {
            let ab = compare(&a, &b, kind);
            let ba = compare(&b, &a, kind);
            assert_eq!(ab.difference, ba.difference.map(|d| round_decimal(-d, 1)));
            assert_eq!(ab.p_value, ba.p_value);
        }
    }

    #[test]
    fn no_data_side_gives_undefined_gap() {
        let a = method(&[(1, 10), (2, 11)]);
        let c = MethodResult::from_runs(RunSet::NoData);
        let gap = compare(&a, &c, TTestKind::Welch);
        assert_eq!(gap.difference, None);
        assert_eq!(gap.p_value, None);
        assert_eq!(GapTier::classify(&gap, &Thresholds::default()), GapTier::Neutral);
    }

    #[test]
    fn single_run_is_not_significant() {
        let a = method(&[(1, 10)]);
        let b = method(&[(1, 20), (1, 21)]);
        let gap = compare(&a, &b, TTestKind::Student);
        assert_eq!(gap.difference, Some(-10.5));
        assert_eq!(gap.p_value, None);
        assert_eq!(GapTier::classify(&gap, &Thresholds::default()), GapTier::Neutral);
    }

    #[test]
    fn tiers_follow_sign_and_threshold() {
        let t = Thresholds::default();
        let gap = |d: f64, p: f64| Gap { difference: Some(d), p_value: Some(p) };
        assert_eq!(
            GapTier::classify(&gap(-1.0, 0.001), &t),
            GapTier::FirstBetter(Strength::Strong)
        );
        assert_eq!(
            GapTier::classify(&gap(-1.0, 0.004), &t),
            GapTier::FirstBetter(Strength::Moderate)
        );
        assert_eq!(GapTier::classify(&gap(2.0, 0.03), &t), GapTier::SecondBetter(Strength::Weak));
        assert_eq!(GapTier::classify(&gap(2.0, 0.2), &t), GapTier::Neutral);
        assert_eq!(GapTier::classify(&gap(0.0, 0.0), &t), GapTier::Neutral);
        assert!(GapTier::classify(&gap(3.0, 0.0), &t).second_wins_strongly());
    }

    #[test]
    fn thresholds_validation() {
        assert!(Thresholds::new([0.01, 0.001, 0.05]).is_err());
        assert!(Thresholds::new([0.0, 0.01, 0.05]).is_err());
        assert!(Thresholds::new([0.001, 0.01, 1.0]).is_ok());
        assert!(Thresholds::try_from(vec![0.01, 0.05]).is_err());
    }
}
