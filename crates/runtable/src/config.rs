//! レポート設定
//!
//! 設定ファイル（TOML / JSON）と CLI 引数をマージする。優先順位は CLI > ファイル > 既定値。

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{best_scores_path, instance_info_path};
use crate::compare::Thresholds;
use crate::error::{ReportError, Result};
use crate::render::ReportFormat;
use crate::ttest::TTestKind;
use crate::types::{GapPair, Method};

pub const DEFAULT_INSTANCES: &str = "all_instances.txt";
pub const DEFAULT_INSTANCES_DIR: &str = "instances";
pub const DEFAULT_PROBLEM: &str = "wvcp";
pub const DEFAULT_OUTPUT: &str = "report.html";

/// 設定ファイル中の手法定義
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodEntry {
    pub id: String,
    pub root: PathBuf,
    /// 省略時は `id`
    #[serde(default)]
    pub display: Option<String>,
}

impl MethodEntry {
    pub fn into_method(self) -> Method {
        let display = self.display.unwrap_or_else(|| self.id.clone());
        Method::new(self.id, self.root, display)
    }
}

/// `ID=ROOT` または `ID=ROOT:DISPLAY`（最後の `:` で区切る）
impl FromStr for MethodEntry {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (id, rest) =
            s.split_once('=').ok_or_else(|| format!("expected ID=ROOT[:DISPLAY], got {s:?}"))?;
        let (root, display) = match rest.rsplit_once(':') {
            Some((root, display)) if !display.is_empty() && !display.contains(['/', '\\']) => {
                (root, Some(display.to_owned()))
            }
            _ => (rest, None),
        };
        if id.trim().is_empty() || root.is_empty() {
            return Err(format!("expected ID=ROOT[:DISPLAY], got {s:?}"));
        }
        Ok(MethodEntry { id: id.trim().to_owned(), root: PathBuf::from(root), display })
    }
}

/// `A:B` 形式のギャップ指定
pub fn parse_gap(s: &str) -> std::result::Result<GapPair, String> {
    match s.split_once(':') {
        Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            Ok(GapPair::new(a.trim(), b.trim()))
        }
        _ => Err(format!("expected A:B, got {s:?}")),
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfigFile {
    /// インスタンス一覧ファイル
    #[serde(default)]
    pub instances: Option<PathBuf>,
    #[serde(default)]
    pub instances_dir: Option<PathBuf>,
    #[serde(default)]
    pub problem: Option<String>,
    /// `instances_dir` からの既定パスを上書きする
    #[serde(default)]
    pub instance_info: Option<PathBuf>,
    #[serde(default)]
    pub best_scores: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub format: Option<ReportFormat>,
    #[serde(default)]
    pub ttest: Option<TTestKind>,
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
    #[serde(default)]
    pub show_edges: Option<bool>,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
    /// 省略時は全ペア
    #[serde(default)]
    pub gaps: Option<Vec<[String; 2]>>,
}

/// 拡張子 `.json` なら JSON、それ以外は TOML として読む
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<ReportConfigFile> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
    let ext = path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase());
    let parsed = match ext.as_deref() {
        Some("json") => serde_json::from_str(&data).map_err(|e| e.to_string()),
        _ => toml::from_str(&data).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| ReportError::ConfigParse { path: path.to_path_buf(), reason })
}

/// CLI で指定された値。`None` / 空は未指定。
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub instances: Option<PathBuf>,
    pub instances_dir: Option<PathBuf>,
    pub problem: Option<String>,
    pub methods: Vec<MethodEntry>,
    pub gaps: Vec<GapPair>,
    pub ttest: Option<TTestKind>,
    pub thresholds: Option<Thresholds>,
    pub show_edges: bool,
    pub output: Option<PathBuf>,
    pub format: Option<ReportFormat>,
}

/// マージ済みの設定
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    pub instances: PathBuf,
    pub instance_info: PathBuf,
    pub best_scores: PathBuf,
    pub methods: Vec<Method>,
    pub gaps: Vec<GapPair>,
    pub ttest: TTestKind,
    pub thresholds: Thresholds,
    pub show_edges: bool,
    pub output: PathBuf,
    pub format: ReportFormat,
}

pub fn merge_config(file: Option<ReportConfigFile>, cli: CliOverrides) -> Result<ReportConfig> {
    let f = file.unwrap_or_default();
    // ディレクトリか問題名を CLI で変えたら、ファイル中の個別パスより規約パスを優先する
    let layout_overridden = cli.instances_dir.is_some() || cli.problem.is_some();

    let instances_dir = cli.instances_dir.or(f.instances_dir);
    let instances_dir = instances_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_INSTANCES_DIR));
    let problem = cli.problem.or(f.problem).unwrap_or_else(|| DEFAULT_PROBLEM.to_owned());
    let instance_info = match f.instance_info {
        Some(p) if !layout_overridden => p,
        _ => instance_info_path(&instances_dir),
    };
    let best_scores = match f.best_scores {
        Some(p) if !layout_overridden => p,
        _ => best_scores_path(&instances_dir, &problem),
    };

    let entries = if cli.methods.is_empty() { f.methods } else { cli.methods };
    let methods: Vec<Method> = entries.into_iter().map(MethodEntry::into_method).collect();
    let gaps = if !cli.gaps.is_empty() {
        cli.gaps
    } else if let Some(g) = f.gaps {
        g.into_iter().map(|[a, b]| GapPair::new(a, b)).collect()
    } else {
        GapPair::all_pairs(&methods)
    };

    let instances = cli.instances.or(f.instances);
    let instances = instances.unwrap_or_else(|| PathBuf::from(DEFAULT_INSTANCES));
    let output = cli.output.or(f.output).unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let format = cli.format.or(f.format).unwrap_or_else(|| ReportFormat::from_path(&output));

    let config = ReportConfig {
        instances,
        instance_info,
        best_scores,
        methods,
        gaps,
        ttest: cli.ttest.or(f.ttest).unwrap_or_default(),
        thresholds: cli.thresholds.or(f.thresholds).unwrap_or_default(),
        show_edges: cli.show_edges || f.show_edges.unwrap_or(false),
        output,
        format,
    };
    config.validate()?;
    Ok(config)
}

impl ReportConfig {
    /// 手法とギャップの整合性を確認する
    pub fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(ReportError::InvalidConfig("no methods configured".into()));
        }
        for (i, m) in self.methods.iter().enumerate() {
            if self.methods[..i].contains(m) {
                return Err(ReportError::InvalidConfig(format!("duplicate method id {}", m.id)));
            }
        }
        for g in &self.gaps {
            for id in [&g.first, &g.second] {
                if !self.methods.iter().any(|m| &m.id == id) {
                    return Err(ReportError::InvalidConfig(format!(
                        "gap refers to unknown method {id}"
                    )));
                }
            }
            if g.first == g.second {
                let id = &g.first;
                return Err(ReportError::InvalidConfig(format!("gap compares {id} with itself")));
            }
        }
        Ok(())
    }
}
