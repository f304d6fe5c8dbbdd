//! レポートグリッドの論理モデル
//!
//! 座標はすべて 0 始まり。結合範囲の左上セル（アンカー）だけが値を持ち、
//! 範囲内の他のセルは `CellValue::Empty` のまま残る。

use serde::Serialize;

use super::classify::MethodMark;
use super::style::{Alignment, Style};
use crate::compare::GapTier;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    /// 固定小数桁で表示する実数
    Decimal { value: f64, places: usize },
    Bool(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn decimal(value: f64, places: usize) -> Self {
        CellValue::Decimal { value, places }
    }

    /// 表示文字列
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(v) => v.to_string(),
            CellValue::Decimal { value, places } => format!("{value:.places$}"),
            CellValue::Bool(true) => "TRUE".to_owned(),
            CellValue::Bool(false) => "FALSE".to_owned(),
        }
    }
}

/// セルに付いた分類（書式の根拠）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellClass {
    Method(MethodMark),
    Gap(GapTier),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell {
    pub value: CellValue,
    #[serde(skip_serializing_if = "Style::is_plain")]
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<CellClass>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Cell { value, style: Style::default(), class: None }
    }

    pub fn empty() -> Self {
        Cell::new(CellValue::Empty)
    }
}

/// 矩形の結合範囲（両端を含む）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Merge {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl Merge {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    pub fn is_anchor(&self, row: usize, col: usize) -> bool {
        self.first_row == row && self.first_col == col
    }

    pub fn row_span(&self) -> usize {
        self.last_row - self.first_row + 1
    }

    pub fn col_span(&self) -> usize {
        self.last_col - self.first_col + 1
    }
}

/// スクロール時に固定する行数・列数（左上から）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Freeze {
    pub rows: usize,
    pub cols: usize,
}

/// 完成したレポートグリッド。構築後は変更しない。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grid {
    pub rows: Vec<Vec<Cell>>,
    pub merges: Vec<Merge>,
    pub freeze: Freeze,
    pub column_widths: Vec<usize>,
    pub alignment: Alignment,
    pub header_rows: usize,
    /// 最初のフッター行の位置
    pub footer_start: usize,
}

impl Grid {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.column_widths.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// `(row, col)` をアンカーとする結合範囲
    pub fn merge_at(&self, row: usize, col: usize) -> Option<&Merge> {
        self.merges.iter().find(|m| m.is_anchor(row, col))
    }

    /// 結合範囲に覆われた非アンカーセルか
    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.merges.iter().any(|m| m.contains(row, col) && !m.is_anchor(row, col))
    }

    /// 行の表示文字列（覆われたセルは空文字）
    pub fn rendered_row(&self, row: usize) -> Vec<String> {
        (0..self.n_cols())
            .map(|col| match self.cell(row, col) {
                Some(cell) if !self.is_covered(row, col) => cell.value.render(),
                _ => String::new(),
            })
            .collect()
    }
}

/// 行を順に追加していくビルダー
#[derive(Debug)]
pub(crate) struct GridBuilder {
    n_cols: usize,
    rows: Vec<Vec<Cell>>,
    merges: Vec<Merge>,
}

impl GridBuilder {
    pub(crate) fn new(n_cols: usize) -> Self {
        GridBuilder { n_cols, rows: Vec::new(), merges: Vec::new() }
    }

    /// 行を追加して行番号を返す。列数に満たない分は空セルで埋める。
    pub(crate) fn push_row(&mut self, mut cells: Vec<Cell>) -> usize {
        debug_assert!(cells.len() <= self.n_cols);
        cells.resize_with(self.n_cols, Cell::empty);
        self.rows.push(cells);
        self.rows.len() - 1
    }

    pub(crate) fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        &mut self.rows[row][col]
    }

    pub(crate) fn merge(
        &mut self,
        first_row: usize,
        first_col: usize,
        last_row: usize,
        last_col: usize,
    ) {
        if first_row == last_row && first_col == last_col {
            return;
        }
        self.merges.push(Merge { first_row, first_col, last_row, last_col });
    }

    /// 列幅を確定させて `Grid` を作る
    pub(crate) fn finish(
        self,
        freeze: Freeze,
        alignment: Alignment,
        header_rows: usize,
        footer_start: usize,
    ) -> Grid {
        let mut grid = Grid {
            rows: self.rows,
            merges: self.merges,
            freeze,
            column_widths: vec![0; self.n_cols],
            alignment,
            header_rows,
            footer_start,
        };
        let mut widths = vec![0; self.n_cols];
        for row in 0..grid.n_rows() {
            for (col, text) in grid.rendered_row(row).into_iter().enumerate() {
                widths[col] = widths[col].max(text.chars().count() + 1);
            }
        }
        grid.column_widths = widths;
        grid
    }
}
