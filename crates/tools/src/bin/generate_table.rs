/// ベンチマーク結果の比較表を生成する
///
/// 使い方:
///   # 設定ファイルから
///   generate_table --config report.toml
///
///   # CLI だけで指定（ギャップ省略時は全ペア）
///   generate_table --method redls=outputs/redls/:RedLS --method ilsts=outputs/ilsts/ \
///       --instances all_instances.txt --output xlsx_files/table.html
///
///   # 標準出力へ JSON、手法別の集計も表示
///   generate_table --config report.toml --output - --format json --summary
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use runtable::Table;
use runtable::catalog::{Catalog, read_instance_list};
use runtable::compare::Thresholds;
use runtable::config::{
    CliOverrides, MethodEntry, ReportConfig, load_config_file, merge_config, parse_gap,
};
use runtable::grid::{LayoutOptions, Report, build_report};
use runtable::render::{ReportFormat, write_report};
use runtable::ttest::TTestKind;
use runtable::types::GapPair;

#[derive(Parser)]
#[command(about = "ベンチマーク結果の集計・比較表を生成")]
struct Cli {
    /// 設定ファイル（TOML または JSON）
    #[arg(long)]
    config: Option<PathBuf>,

    /// インスタンス一覧（1行1名）
    #[arg(long)]
    instances: Option<PathBuf>,

    /// instance_info.txt と best_scores_<problem>.txt を置いたディレクトリ
    #[arg(long)]
    instances_dir: Option<PathBuf>,

    /// 問題名（best_scores_<problem>.txt を選ぶ）
    #[arg(long)]
    problem: Option<String>,

    /// 手法 ID=ROOT[:DISPLAY]（複数指定可、指定順が列順）
    #[arg(long = "method", value_name = "ID=ROOT[:DISPLAY]")]
    methods: Vec<MethodEntry>,

    /// 比較ペア A:B（複数指定可）
    #[arg(long = "gap", value_name = "A:B", value_parser = parse_gap)]
    gaps: Vec<GapPair>,

    /// t 検定の種類
    #[arg(long, value_name = "welch|student")]
    ttest: Option<TTestKind>,

    /// 有意水準 3 つ（厳しい順、カンマ区切り）
    #[arg(long, value_delimiter = ',')]
    thresholds: Option<Vec<f64>>,

    /// |E| 列を表示
    #[arg(long)]
    show_edges: bool,

    /// 出力形式（省略時は拡張子から推定）
    #[arg(long, value_name = "html|json|csv|text")]
    format: Option<ReportFormat>,

    /// 出力先（- で標準出力）
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// 手法別の集計を表示
    #[arg(long)]
    summary: bool,
}

fn overrides(cli: &Cli) -> Result<CliOverrides> {
    let thresholds = match &cli.thresholds {
        Some(v) => Some(Thresholds::try_from(v.clone()).map_err(anyhow::Error::msg)?),
        None => None,
    };
    Ok(CliOverrides {
        instances: cli.instances.clone(),
        instances_dir: cli.instances_dir.clone(),
        problem: cli.problem.clone(),
        methods: cli.methods.clone(),
        gaps: cli.gaps.clone(),
        ttest: cli.ttest,
        thresholds,
        show_edges: cli.show_edges,
        output: cli.output.clone(),
        format: cli.format,
    })
}

fn print_summary(table: &Table, report: &Report, to_stderr: bool) {
    let mut lines = Vec::new();
    lines.push(format!("インスタンス数: {}", report.tallies.instances));
    lines.push("=".repeat(75));
    for (m, t) in table.methods.iter().zip(&report.tallies.methods) {
        let ratio = t.ratio().map_or_else(|| "-".to_owned(), |r| format!("{r:.2}"));
        lines.push(format!(
            "  {:16} | best:{:3} optim:{:3} | 有意に良:{:3} 悪:{:3} | 比:{}",
            m.display_name, t.best, t.optimal, t.better, t.worse, ratio
        ));
    }
    for line in lines {
        if to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

fn run(config: &ReportConfig, summary: bool) -> Result<()> {
    let catalog = Catalog::load(&config.instance_info, &config.best_scores)
        .context("参照テーブルの読み込みに失敗")?;
    let list = config.instances.display();
    let names = read_instance_list(&config.instances)
        .with_context(|| format!("インスタンス一覧の読み込みに失敗: {list}"))?;
    let (methods, gaps) = (config.methods.clone(), config.gaps.clone());
    let table = Table::load(&catalog, &names, methods, gaps, config.ttest)
        .context("試行結果の集計に失敗")?;

    let opts = LayoutOptions {
        show_edges: config.show_edges,
        thresholds: config.thresholds,
        ..Default::default()
    };
    let report = build_report(&table, &opts);
    log::info!("grid: {} rows x {} cols", report.grid.n_rows(), report.grid.n_cols());
    write_report(&report.grid, config.format, &config.output)
        .with_context(|| format!("レポートの書き出しに失敗: {}", config.output.display()))?;

    if summary {
        print_summary(&table, &report, config.output.as_os_str() == "-");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => {
            let context = format!("設定ファイルの読み込みに失敗: {}", path.display());
            Some(load_config_file(path).context(context)?)
        }
        None => None,
    };
    let config = merge_config(file, overrides(&cli)?)?;
    log::debug!("config: {}", serde_json::to_string(&config.methods)?);
    run(&config, cli.summary)
}
