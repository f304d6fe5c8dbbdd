//! 読み込み → 集計 → 比較
//!
//! インスタンス単位で並列に処理する。各 (instance, method) のスロットは
//! 1つのワーカーだけが書き、結果は入力順に回収するので実行順序に依存しない。
//! ギャップはそのインスタンスの全手法の集計が終わってから計算する。

use std::collections::HashMap;

use rayon::prelude::*;

use crate::aggregate::MethodResult;
use crate::catalog::Catalog;
use crate::compare::compare;
use crate::error::{ReportError, Result};
use crate::loader::load_runs;
use crate::ttest::TTestKind;
use crate::types::{Gap, GapPair, Instance, Method, RunSet};

/// 1インスタンス分の集計行
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRow {
    pub instance: Instance,
    /// `Table::methods` と同じ順序
    pub methods: Vec<MethodResult>,
    /// `Table::pairs` と同じ順序
    pub gaps: Vec<Gap>,
}

/// 全インスタンス × 全手法の集計結果
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub methods: Vec<Method>,
    pub pairs: Vec<GapPair>,
    pub rows: Vec<InstanceRow>,
    method_index: HashMap<String, usize>,
    pair_index: Vec<(usize, usize)>,
}

fn index_methods(
    methods: &[Method],
    pairs: &[GapPair],
) -> Result<(HashMap<String, usize>, Vec<(usize, usize)>)> {
    let mut method_index = HashMap::new();
    for (i, m) in methods.iter().enumerate() {
        if method_index.insert(m.id.clone(), i).is_some() {
            return Err(ReportError::InvalidConfig(format!("duplicate method id {}", m.id)));
        }
    }
    let lookup = |id: &str| {
        method_index
            .get(id)
            .copied()
            .ok_or_else(|| ReportError::InvalidConfig(format!("gap refers to unknown method {id}")))
    };
    let mut pair_index = Vec::with_capacity(pairs.len());
    for p in pairs {
        let (a, b) = (lookup(&p.first)?, lookup(&p.second)?);
        if a == b {
            return Err(ReportError::InvalidConfig(format!("gap compares {} with itself", p.first)));
        }
        pair_index.push((a, b));
    }
    Ok((method_index, pair_index))
}

fn build_row(
    instance: Instance,
    methods: Vec<MethodResult>,
    pair_index: &[(usize, usize)],
    kind: TTestKind,
) -> InstanceRow {
    let gaps = pair_index.iter().map(|&(a, b)| compare(&methods[a], &methods[b], kind)).collect();
    InstanceRow { instance, methods, gaps }
}

impl Table {
    /// 結果ディレクトリから全試行を読み込んで集計する。
    ///
    /// 未知のインスタンスや壊れた結果ファイルがあれば、その時点で全体を中止する。
    pub fn load(
        catalog: &Catalog,
        instance_names: &[String],
        methods: Vec<Method>,
        pairs: Vec<GapPair>,
        kind: TTestKind,
    ) -> Result<Self> {
        let (method_index, pair_index) = index_methods(&methods, &pairs)?;
        let instances = catalog.resolve_all(instance_names)?;
        log::info!(
            "loading {} instances x {} methods ({} gaps, {kind:?} t-test)",
            instances.len(),
            methods.len(),
            pairs.len()
        );

        let loaded: Vec<Result<InstanceRow>> = instances
            .into_par_iter()
            .map(|instance| {
                let results = methods
                    .iter()
                    .map(|m| load_runs(m, &instance.name).map(MethodResult::from_runs))
                    .collect::<Result<Vec<_>>>()?;
                Ok(build_row(instance, results, &pair_index, kind))
            })
            .collect();
        // 入力順で最初のエラーを報告する
        let rows = loaded.into_iter().collect::<Result<Vec<_>>>()?;

        let table = Table { methods, pairs, rows, method_index, pair_index };
        table.warn_empty_methods();
        Ok(table)
    }

    /// 読み込み済みの試行集合から組み立てる。`runs[i]` は `methods` と同じ順序。
    pub fn from_runs(
        methods: Vec<Method>,
        pairs: Vec<GapPair>,
        runs: Vec<(Instance, Vec<RunSet>)>,
        kind: TTestKind,
    ) -> Result<Self> {
        let (method_index, pair_index) = index_methods(&methods, &pairs)?;
        let mut rows = Vec::with_capacity(runs.len());
        for (instance, sets) in runs {
            if sets.len() != methods.len() {
                return Err(ReportError::InvalidConfig(format!(
                    "instance {} has {} run sets for {} methods",
                    instance.name,
                    sets.len(),
                    methods.len()
                )));
            }
            let results = sets.into_iter().map(MethodResult::from_runs).collect();
            rows.push(build_row(instance, results, &pair_index, kind));
        }
        Ok(Table { methods, pairs, rows, method_index, pair_index })
    }

    fn warn_empty_methods(&self) {
        for (i, m) in self.methods.iter().enumerate() {
            if !self.rows.is_empty() && self.rows.iter().all(|r| r.methods[i].runs.is_no_data()) {
                log::warn!("method {} has no result files under {}", m.id, m.root.display());
            }
        }
    }

    /// 各ギャップの (1番目, 2番目) の手法インデックス
    pub fn pair_indices(&self) -> &[(usize, usize)] {
        &self.pair_index
    }

    pub fn method_position(&self, id: &str) -> Option<usize> {
        self.method_index.get(id).copied()
    }

    fn row(&self, instance: &str) -> Option<&InstanceRow> {
        self.rows.iter().find(|r| r.instance.name == instance)
    }

    /// (instance, method) で集計結果を引く
    pub fn result(&self, instance: &str, method: &str) -> Option<&MethodResult> {
        let i = self.method_position(method)?;
        self.row(instance).map(|r| &r.methods[i])
    }

    /// (instance, (first, second)) でギャップを引く。ペアの向きは設定通りに一致する必要がある。
    pub fn gap(&self, instance: &str, first: &str, second: &str) -> Option<&Gap> {
        let a = self.method_position(first)?;
        let b = self.method_position(second)?;
        let g = self.pair_index.iter().position(|&p| p == (a, b))?;
        self.row(instance).map(|r| &r.gaps[g])
    }
}
