//! JSON 出力（グリッドモデルをそのまま）

use std::io::{self, Write};

use crate::grid::Grid;

pub(super) fn render<W: Write>(grid: &Grid, w: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, grid)?;
    writeln!(w)
}
