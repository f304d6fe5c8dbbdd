//! レポートグリッド
//!
//! 分類 → 集計 → レイアウトの順に組み立てる。

pub mod classify;
pub mod layout;
pub mod model;
pub mod style;
pub mod tally;

pub use classify::{BestTier, Classification, MethodMark, classify};
pub use layout::{LayoutOptions, Report, build_grid, build_report};
pub use model::{Cell, CellClass, CellValue, Freeze, Grid, Merge};
pub use style::{Alignment, Palette, Rgb, Style};
pub use tally::{GapTally, MethodTally, Tallies, tally};
