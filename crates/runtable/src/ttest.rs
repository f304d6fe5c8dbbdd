//! 独立2標本 t 検定
//!
//! 標本数が2未満の側がある場合や、標準誤差 0 で平均も等しい場合は
//! 検定不能（`None`）を返す。呼び出し側はこれを「有意でない」として扱う。

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// 分散の扱い
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TTestKind {
    /// 等分散を仮定しない（Welch–Satterthwaite の自由度）
    #[default]
    Welch,
    /// プール分散（Student）
    Student,
}

impl std::str::FromStr for TTestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "welch" => Ok(TTestKind::Welch),
            "student" => Ok(TTestKind::Student),
            other => Err(format!("unknown t-test kind: {other} (expected welch|student)")),
        }
    }
}

/// 検定結果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TTest {
    pub statistic: f64,
    pub df: f64,
    /// 両側 p 値
    pub p_value: f64,
}

fn mean_var(xs: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

/// `a` と `b` の平均差を検定する。統計量の符号は `mean(a) - mean(b)` に従う。
pub fn ttest_ind(a: &[f64], b: &[f64], kind: TTestKind) -> Option<TTest> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let (m1, v1) = mean_var(a);
    let (m2, v2) = mean_var(b);

    let (se, df) = match kind {
        TTestKind::Student => {
            let df = n1 + n2 - 2.0;
            let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
            ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
        }
        TTestKind::Welch => {
            let vn1 = v1 / n1;
            let vn2 = v2 / n2;
            let df = (vn1 + vn2).powi(2) / (vn1.powi(2) / (n1 - 1.0) + vn2.powi(2) / (n2 - 1.0));
            // 両標本とも分散 0 だと自由度が 0/0 になる
            let df = if df.is_nan() { 1.0 } else { df };
            ((vn1 + vn2).sqrt(), df)
        }
    };

    let diff = m1 - m2;
    if se == 0.0 {
        if diff == 0.0 {
            return None;
        }
        return Some(TTest { statistic: diff.signum() * f64::INFINITY, df, p_value: 0.0 });
    }
    let t = diff / se;
    if !t.is_finite() {
        return None;
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p = (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0);
    Some(TTest { statistic: t, df, p_value: p })
}
