//! 固定幅テキスト出力
//!
//! 横方向の結合は列幅を合算して1セルとして描く。縦方向に覆われたセルは空白。

use std::io::{self, Write};

use crate::grid::{Alignment, Grid};

const SEP: &str = " ";

fn pad(text: &str, width: usize, alignment: Alignment) -> String {
    match alignment {
        Alignment::Center => format!("{text:^width$}"),
        Alignment::Left => format!("{text:<width$}"),
        Alignment::Right => format!("{text:>width$}"),
    }
}

fn line(grid: &Grid, row: usize) -> String {
    let n = grid.n_cols();
    let mut parts = Vec::with_capacity(n);
    let mut col = 0;
    while col < n {
        let span = grid
            .merges
            .iter()
            .find(|m| m.contains(row, col) && m.first_col == col)
            .map(|m| (m.col_span(), m.first_row == row));
        let (span, anchor) = span.unwrap_or((1, true));
        let text = match grid.cell(row, col) {
            Some(cell) if anchor => cell.value.render(),
            _ => String::new(),
        };
        let width =
            grid.column_widths[col..col + span].iter().sum::<usize>() + SEP.len() * (span - 1);
        parts.push(pad(&text, width, grid.alignment));
        col += span;
    }
    parts.join(SEP).trim_end().to_owned()
}

fn rule(grid: &Grid) -> String {
    let total =
        grid.column_widths.iter().sum::<usize>() + SEP.len() * grid.n_cols().saturating_sub(1);
    "-".repeat(total)
}

pub(super) fn render<W: Write>(grid: &Grid, w: &mut W) -> io::Result<()> {
    for row in 0..grid.n_rows() {
        if row > 0 && (row == grid.header_rows || row == grid.footer_start) {
            writeln!(w, "{}", rule(grid))?;
        }
        writeln!(w, "{}", line(grid, row))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::model::{Cell, CellValue, Freeze, GridBuilder};

    #[test]
    fn merged_cells_span_their_columns() {
        let mut b = GridBuilder::new(3);
        b.push_row(vec![Cell::new(CellValue::text("n")), Cell::new(CellValue::text("A"))]);
        b.push_row(vec![
            Cell::empty(),
            Cell::new(CellValue::text("best")),
            Cell::new(CellValue::text("#")),
        ]);
        b.push_row(vec![
            Cell::new(CellValue::text("X")),
            Cell::new(CellValue::Int(48)),
            Cell::new(CellValue::text("2/2")),
        ]);
        b.merge(0, 0, 1, 0);
        b.merge(0, 1, 0, 2);
        let g = b.finish(Freeze { rows: 2, cols: 1 }, Alignment::Center, 2, 3);
        assert_eq!(g.column_widths, vec![2, 5, 4]);

        let mut out = Vec::new();
        render(&g, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["n      A", "   best   #", "-".repeat(13).as_str(), "X   48   2/2"]);
    }
}
