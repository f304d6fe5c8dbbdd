//! CSV 出力。結合範囲はアンカーセルだけに値を書く。

use std::io::{self, Write};

use crate::grid::Grid;

pub(super) fn render<W: Write>(grid: &Grid, w: &mut W) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(false).from_writer(w);
    for row in 0..grid.n_rows() {
        wtr.write_record(grid.rendered_row(row))?;
    }
    wtr.flush()
}
