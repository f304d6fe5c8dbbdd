//! 入出力の共通ヘルパー

pub mod io;
