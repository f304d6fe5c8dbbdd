//! HTML 出力
//!
//! ヘッダー行は `<thead>`、フッター行は `<tfoot>` に置く。固定ペインは
//! `position: sticky` で表現し、列幅は `ch` 単位で指定する。

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::grid::{Alignment, Cell, Grid};

const STYLESHEET: &str = "\
table { border-collapse: separate; border-spacing: 0; font-family: monospace; }
th, td { border: 1px solid #999; padding: 0 0.5ch; white-space: nowrap; background: #fff; }
thead th { position: sticky; z-index: 2; }
.frozen { position: sticky; z-index: 1; }
thead th.frozen { z-index: 3; }
";

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn align(a: Alignment) -> &'static str {
    match a {
        Alignment::Center => "center",
        Alignment::Left => "left",
        Alignment::Right => "right",
    }
}

/// 固定列の左端位置（ch）。パディングと罫線の分を 1ch と見積もる。
fn sticky_offsets(grid: &Grid) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(grid.freeze.cols);
    let mut left = 0;
    for w in grid.column_widths.iter().take(grid.freeze.cols) {
        offsets.push(left);
        left += w + 1;
    }
    offsets
}

fn cell_html(grid: &Grid, row: usize, col: usize, cell: &Cell, offsets: &[usize]) -> String {
    let tag = if row < grid.header_rows { "th" } else { "td" };
    let mut attrs = String::new();
    if let Some(m) = grid.merge_at(row, col) {
        if m.row_span() > 1 {
            let _ = write!(attrs, " rowspan=\"{}\"", m.row_span());
        }
        if m.col_span() > 1 {
            let _ = write!(attrs, " colspan=\"{}\"", m.col_span());
        }
    }

    let mut style = format!("text-align: {};", align(grid.alignment));
    if cell.style.bold {
        style.push_str(" font-weight: bold;");
    }
    if let Some(c) = cell.style.font_color {
        let _ = write!(style, " color: {};", c.hex());
    }
    if let Some(c) = cell.style.fill {
        let _ = write!(style, " background: {};", c.hex());
    }
    if row < grid.freeze.rows {
        // 1行の高さを 1.5em と見積もる
        let _ = write!(style, " top: {}em;", row as f64 * 1.5);
    }
    if let Some(left) = offsets.get(col) {
        attrs.push_str(" class=\"frozen\"");
        let _ = write!(style, " left: {left}ch;");
    }
    format!("<{tag}{attrs} style=\"{style}\">{}</{tag}>", escape(&cell.value.render()))
}

fn write_section<W: Write>(
    grid: &Grid,
    w: &mut W,
    tag: &str,
    rows: std::ops::Range<usize>,
    offsets: &[usize],
) -> io::Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(w, "<{tag}>")?;
    for row in rows {
        write!(w, "<tr>")?;
        for (col, cell) in grid.rows[row].iter().enumerate() {
            if grid.is_covered(row, col) {
                continue;
            }
            write!(w, "{}", cell_html(grid, row, col, cell, offsets))?;
        }
        writeln!(w, "</tr>")?;
    }
    writeln!(w, "</{tag}>")
}

pub(super) fn render<W: Write>(grid: &Grid, w: &mut W) -> io::Result<()> {
    let offsets = sticky_offsets(grid);
    writeln!(w, "<!DOCTYPE html>")?;
    writeln!(w, "<html>\n<head>\n<meta charset=\"utf-8\">\n<title>results</title>")?;
    writeln!(w, "<style>\n{STYLESHEET}</style>\n</head>\n<body>\n<table>")?;
    write!(w, "<colgroup>")?;
    for width in &grid.column_widths {
        write!(w, "<col style=\"width: {width}ch;\">")?;
    }
    writeln!(w, "</colgroup>")?;

    let header_end = grid.header_rows.min(grid.n_rows());
    let footer_start = grid.footer_start.clamp(header_end, grid.n_rows());
    write_section(grid, w, "thead", 0..header_end, &offsets)?;
    write_section(grid, w, "tbody", header_end..footer_start, &offsets)?;
    write_section(grid, w, "tfoot", footer_start..grid.n_rows(), &offsets)?;
    writeln!(w, "</table>\n</body>\n</html>")
}
