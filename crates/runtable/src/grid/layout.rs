//! グリッドの組み立て
//!
//! 列構成: メタデータ列 | 手法ごとに 4 列 | ギャップごとに 2 列。
//! 行構成: ヘッダー 2 行 | インスタンスごとに 1 行 | フッター 5 行。

use serde::Serialize;

use super::classify::{BestTier, Classification, MethodMark, classify};
use super::model::{Cell, CellClass, CellValue, Freeze, Grid, GridBuilder};
use super::style::{Alignment, Palette, Style};
use super::tally::{Tallies, tally};
use crate::aggregate::MethodResult;
use crate::compare::{GapTier, Thresholds};
use crate::pipeline::{InstanceRow, Table};
use crate::types::Gap;

/// 手法グループのサブ列
pub const METHOD_COLUMNS: [&str; 4] = ["best", "avg", "time", "#"];
/// ギャップグループのサブ列
pub const GAP_COLUMNS: [&str; 2] = ["diff", "pvalue"];
pub const HEADER_ROWS: usize = 2;

pub const FOOTER_BEST: &str = "nb total best";
pub const FOOTER_OPTIMAL: &str = "nb total optim";
pub const FOOTER_BETTER: &str = "nb times significantly better";
pub const FOOTER_WORSE: &str = "nb times significantly worse";
pub const FOOTER_RATIO: &str = "ratio better/worse";

/// 値の無いセルの表示
pub const PLACEHOLDER: &str = "-";

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOptions {
    /// メタデータに `|E|` 列を含める
    pub show_edges: bool,
    pub thresholds: Thresholds,
    pub alignment: Alignment,
    pub palette: Palette,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            show_edges: false,
            thresholds: Thresholds::default(),
            alignment: Alignment::Center,
            palette: Palette::default(),
        }
    }
}

/// グリッドと、その根拠になった分類・集計
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub grid: Grid,
    #[serde(skip)]
    pub classification: Classification,
    pub tallies: Tallies,
}

#[derive(Clone, Copy, Debug)]
struct Columns {
    meta: usize,
    methods: usize,
    gaps: usize,
}

impl Columns {
    fn method(&self, i: usize) -> usize {
        self.meta + i * METHOD_COLUMNS.len()
    }

    fn gap(&self, j: usize) -> usize {
        self.meta + self.methods * METHOD_COLUMNS.len() + j * GAP_COLUMNS.len()
    }

    fn total(&self) -> usize {
        self.gap(self.gaps)
    }
}

fn meta_titles(show_edges: bool) -> Vec<&'static str> {
    if show_edges {
        vec!["instance", "|V|", "|E|", "BKS", "optim"]
    } else {
        vec!["instance", "|V|", "BKS", "optim"]
    }
}

fn bold(value: CellValue) -> Cell {
    let mut cell = Cell::new(value);
    cell.style.bold = true;
    cell
}

fn header_cell(text: &str, palette: &Palette) -> Cell {
    let mut cell = bold(CellValue::text(text));
    cell.style.fill = Some(palette.header_fill);
    cell
}

pub fn build_report(table: &Table, opts: &LayoutOptions) -> Report {
    let classification = classify(table, &opts.thresholds);
    let tallies = tally(table, &classification);
    let grid = layout(table, &classification, &tallies, opts);
    Report { grid, classification, tallies }
}

pub fn build_grid(table: &Table, opts: &LayoutOptions) -> Grid {
    build_report(table, opts).grid
}

fn layout(
    table: &Table,
    classification: &Classification,
    tallies: &Tallies,
    opts: &LayoutOptions,
) -> Grid {
    let titles = meta_titles(opts.show_edges);
    let cols = Columns {
        meta: titles.len(),
        methods: table.methods.len(),
        gaps: table.pairs.len(),
    };
    let mut b = GridBuilder::new(cols.total());

    write_header(&mut b, table, &titles, cols, &opts.palette);
    let rows = table.rows.iter().zip(&classification.marks).zip(&classification.gaps);
    for ((row, marks), tiers) in rows {
        let cells = data_row(row, marks, tiers, opts);
        b.push_row(cells);
    }
    let footer_start = b.n_rows();
    write_footer(&mut b, table, tallies, cols);

    let freeze = Freeze { rows: HEADER_ROWS, cols: cols.meta };
    b.finish(freeze, opts.alignment, HEADER_ROWS, footer_start)
}

fn write_header(
    b: &mut GridBuilder,
    table: &Table,
    titles: &[&str],
    cols: Columns,
    palette: &Palette,
) {
    let top = b.push_row(Vec::new());
    let sub = b.push_row(Vec::new());

    for (c, title) in titles.iter().enumerate() {
        *b.cell_mut(top, c) = header_cell(title, palette);
        b.merge(top, c, sub, c);
    }
    for (i, method) in table.methods.iter().enumerate() {
        let c = cols.method(i);
        *b.cell_mut(top, c) = header_cell(&method.display_name, palette);
        b.merge(top, c, top, c + METHOD_COLUMNS.len() - 1);
        for (k, label) in METHOD_COLUMNS.iter().enumerate() {
            *b.cell_mut(sub, c + k) = header_cell(label, palette);
        }
    }
    let name = |i: usize| table.methods[i].display_name.as_str();
    for (j, &(first, second)) in table.pair_indices().iter().enumerate() {
        let c = cols.gap(j);
        let title = format!("gap {}-{}", name(first), name(second));
        *b.cell_mut(top, c) = header_cell(&title, palette);
        b.merge(top, c, top, c + GAP_COLUMNS.len() - 1);
        for (k, label) in GAP_COLUMNS.iter().enumerate() {
            *b.cell_mut(sub, c + k) = header_cell(label, palette);
        }
    }
}

fn or_placeholder<T>(value: Option<T>, f: impl FnOnce(T) -> CellValue) -> CellValue {
    value.map_or_else(|| CellValue::text(PLACEHOLDER), f)
}

/// best 列の書式。最適性シグナルの色は BKS 分類の色より優先する。
pub fn method_style(mark: &MethodMark, palette: &Palette) -> Style {
    let font_color = if mark.proven_optimal {
        Some(palette.proven_optimal)
    } else {
        match mark.best {
            BestTier::NewBest => Some(palette.new_best),
            BestTier::AtKnownBest => Some(palette.at_known_best),
            BestTier::None => None,
        }
    };
    Style { bold: mark.is_marked(), font_color, fill: None }
}

fn method_cells(result: &MethodResult, mark: MethodMark, palette: &Palette) -> [Cell; 4] {
    let s = result.result.summary();
    let mut best = Cell::new(or_placeholder(s.map(|s| s.best), CellValue::Int));
    best.style = method_style(&mark, palette);
    best.class = Some(CellClass::Method(mark));
    [
        best,
        Cell::new(or_placeholder(s.map(|s| s.average), |v| CellValue::decimal(v, 1))),
        Cell::new(or_placeholder(s.map(|s| s.mean_time_at_best), |v| CellValue::decimal(v, 1))),
        Cell::new(CellValue::text(format!(
            "{}/{}",
            result.result.count_achieving_best(),
            result.result.total_runs()
        ))),
    ]
}

fn gap_cells(gap: &Gap, tier: GapTier, palette: &Palette) -> [Cell; 2] {
    let style = Style { bold: false, font_color: None, fill: palette.gap_fill(tier) };
    let mut cells = [
        Cell::new(or_placeholder(gap.difference, |v| CellValue::decimal(v, 1))),
        Cell::new(or_placeholder(gap.p_value, |v| CellValue::decimal(v, 3))),
    ];
    for cell in &mut cells {
        cell.style = style;
        cell.class = Some(CellClass::Gap(tier));
    }
    cells
}

fn data_row(
    row: &InstanceRow,
    marks: &[MethodMark],
    tiers: &[GapTier],
    opts: &LayoutOptions,
) -> Vec<Cell> {
    let inst = &row.instance;
    let mut cells = vec![
        Cell::new(CellValue::text(inst.name.clone())),
        Cell::new(CellValue::Int(inst.vertex_count as i64)),
    ];
    if opts.show_edges {
        cells.push(Cell::new(CellValue::Int(inst.edge_count as i64)));
    }
    cells.push(Cell::new(CellValue::Int(inst.best_known_score)));
    cells.push(Cell::new(CellValue::Bool(inst.is_known_optimal)));

    for (result, mark) in row.methods.iter().zip(marks) {
        cells.extend(method_cells(result, *mark, &opts.palette));
    }
    for (gap, tier) in row.gaps.iter().zip(tiers) {
        cells.extend(gap_cells(gap, *tier, &opts.palette));
    }
    cells
}

/// フッター1行。ラベルはメタデータ列、手法の値は手法グループ全体に結合する。
fn footer_row(
    b: &mut GridBuilder,
    cols: Columns,
    label: &str,
    per_method: Vec<CellValue>,
    per_gap: Option<Vec<(String, usize)>>,
) {
    let r = b.push_row(Vec::new());
    *b.cell_mut(r, 0) = bold(CellValue::text(label));
    b.merge(r, 0, r, cols.meta - 1);
    for (i, value) in per_method.into_iter().enumerate() {
        let c = cols.method(i);
        *b.cell_mut(r, c) = Cell::new(value);
        b.merge(r, c, r, c + METHOD_COLUMNS.len() - 1);
    }
    for (j, (text, count)) in per_gap.into_iter().flatten().enumerate() {
        let c = cols.gap(j);
        *b.cell_mut(r, c) = Cell::new(CellValue::text(text));
        *b.cell_mut(r, c + 1) = Cell::new(CellValue::Int(count as i64));
    }
}

/// 5行を固定順で書く。ギャップ列の勝数は先頭2行のギャップセルに同居させる。
fn write_footer(b: &mut GridBuilder, table: &Table, tallies: &Tallies, cols: Columns) {
    let n = tallies.instances;
    let name = |i: usize| table.methods[i].display_name.as_str();
    let pairs = table.pair_indices();

    let best = tallies.methods.iter().map(|t| CellValue::text(format!("{}/{n}", t.best))).collect();
    let second_wins = pairs
        .iter()
        .zip(&tallies.gaps)
        .map(|(&(_, second), g)| (format!("{} better", name(second)), g.second_wins))
        .collect();
    footer_row(b, cols, FOOTER_BEST, best, Some(second_wins));

    let optimal = tallies
        .methods
        .iter()
        .map(|t| CellValue::text(format!("{}/{n}", t.optimal)))
        .collect();
    let first_wins = pairs
        .iter()
        .zip(&tallies.gaps)
        .map(|(&(first, _), g)| (format!("{} better", name(first)), g.first_wins))
        .collect();
    footer_row(b, cols, FOOTER_OPTIMAL, optimal, Some(first_wins));

    let better = tallies.methods.iter().map(|t| CellValue::Int(t.better as i64)).collect();
    footer_row(b, cols, FOOTER_BETTER, better, None);

    let worse = tallies.methods.iter().map(|t| CellValue::Int(t.worse as i64)).collect();
    footer_row(b, cols, FOOTER_WORSE, worse, None);

    let ratio = tallies
        .methods
        .iter()
        .map(|t| t.ratio().map_or_else(|| PLACEHOLDER.to_owned(), |r| format!("{r:.2}")))
        .map(CellValue::text)
        .collect();
    footer_row(b, cols, FOOTER_RATIO, ratio, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ttest::TTestKind;
    use crate::types::{GapPair, Instance, Method, RunRecord, RunSet};

    fn runs(pairs: &[(i64, i64)]) -> RunSet {
        RunSet::Runs(pairs.iter().map(|&(t, s)| RunRecord::new(t, s)).collect())
    }

    fn scenario() -> Table {
        let methods = vec![
            Method::new("a", "out/a", "A"),
            Method::new("b", "out/b", "B"),
            Method::new("c", "out/c", "C"),
        ];
        let x = Instance {
            name: "X".into(),
            vertex_count: 100,
            edge_count: 400,
            best_known_score: 50,
            is_known_optimal: false,
        };
        let sets = vec![
            runs(&[(10, 50), (12, 52), (9, 50)]),
            runs(&[(20, 48), (22, 48)]),
            RunSet::NoData,
        ];
        Table::from_runs(
            methods.clone(),
            GapPair::all_pairs(&methods),
            vec![(x, sets)],
            TTestKind::Welch,
        )
        .unwrap()
    }

    #[test]
    fn shape_and_header_merges() {
        let g = build_grid(&scenario(), &LayoutOptions::default());
        // 4 meta + 3*4 + 3*2
        assert_eq!(g.n_cols(), 22);
        assert_eq!(g.n_rows(), HEADER_ROWS + 1 + 5);
        assert_eq!(g.footer_start, 3);
        assert_eq!(g.freeze, Freeze { rows: 2, cols: 4 });
        for c in 0..4 {
            assert_eq!(g.merge_at(0, c).map(|m| (m.row_span(), m.col_span())), Some((2, 1)));
        }
        assert_eq!(g.merge_at(0, 4).map(|m| m.col_span()), Some(4));
        assert_eq!(g.cell(0, 4).unwrap().value, CellValue::text("A"));
        assert_eq!(g.cell(0, 16).unwrap().value, CellValue::text("gap A-B"));
        assert_eq!(g.merge_at(0, 16).map(|m| m.col_span()), Some(2));
        assert_eq!(g.rendered_row(1)[4..8], ["best", "avg", "time", "#"]);
        assert_eq!(g.rendered_row(1)[16..18], ["diff", "pvalue"]);
    }

    #[test]
    fn data_row_values_and_styles() {
        let g = build_grid(&scenario(), &LayoutOptions::default());
        let row = g.rendered_row(2);
        assert_eq!(row[..4], ["X", "100", "50", "FALSE"]);
        assert_eq!(row[4..8], ["50", "50.7", "9.5", "2/3"]);
        assert_eq!(row[8..12], ["48", "48.0", "21.0", "2/2"]);
        assert_eq!(row[12..16], ["-", "-", "-", "0/0"]);
        assert_eq!(row[16..18], ["2.7", "0.057"]);
        assert_eq!(row[18..20], ["-", "-"]);

        let p = Palette::default();
        let a = g.cell(2, 4).unwrap();
        assert!(a.style.bold);
        assert_eq!(a.style.font_color, Some(p.at_known_best));
        let b = g.cell(2, 8).unwrap();
        assert_eq!(b.style.font_color, Some(p.new_best));
        let c = g.cell(2, 12).unwrap();
        assert!(!c.style.bold);
        assert_eq!(c.style.font_color, None);
    }

    #[test]
    fn footer_rows_in_order() {
        let g = build_grid(&scenario(), &LayoutOptions::default());
        let labels: Vec<String> =
            (g.footer_start..g.n_rows()).map(|r| g.rendered_row(r)[0].clone()).collect();
        assert_eq!(
            labels,
            [FOOTER_BEST, FOOTER_OPTIMAL, FOOTER_BETTER, FOOTER_WORSE, FOOTER_RATIO]
        );

        let best = g.rendered_row(g.footer_start);
        assert_eq!(best[4], "1/1");
        assert_eq!(best[8], "1/1");
        assert_eq!(best[12], "0/1");
        assert_eq!(best[16..18], ["B better", "0"]);
        let optim = g.rendered_row(g.footer_start + 1);
        assert_eq!(optim[16..18], ["A better", "0"]);
        for r in g.footer_start + 2..g.n_rows() {
            assert_eq!(g.rendered_row(r)[16..22], ["", "", "", "", "", ""]);
        }
        let ratio = g.rendered_row(g.footer_start + 4);
        assert_eq!(ratio[4], "-");
        assert!(g.merge_at(g.footer_start, 0).is_some());
        assert_eq!(g.merge_at(g.footer_start + 2, 8).map(|m| m.col_span()), Some(4));
    }

    #[test]
    fn optimality_colour_takes_priority() {
        let mark = MethodMark { best: BestTier::NewBest, proven_optimal: true };
        let p = Palette::default();
        let s = method_style(&mark, &p);
        assert!(s.bold);
        assert_eq!(s.font_color, Some(p.proven_optimal));
    }

    #[test]
    fn show_edges_adds_a_meta_column() {
        let opts = LayoutOptions { show_edges: true, ..Default::default() };
        let g = build_grid(&scenario(), &opts);
        assert_eq!(g.n_cols(), 23);
        assert_eq!(g.freeze.cols, 5);
        assert_eq!(g.rendered_row(2)[2], "400");
    }

    #[test]
    fn widths_cover_every_rendered_value() {
        let g = build_grid(&scenario(), &LayoutOptions::default());
        for r in 0..g.n_rows() {
            for (c, text) in g.rendered_row(r).iter().enumerate() {
                assert!(g.column_widths[c] > text.chars().count());
            }
        }
    }
}
