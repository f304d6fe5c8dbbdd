//! セルの書式と配色

use serde::{Serialize, Serializer};

use crate::compare::{GapTier, Strength};

/// 24bit カラー。`#RRGGBB` としてシリアライズする。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

/// シート全体で統一する水平方向の配置
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Center,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Style {
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgb>,
}

impl Style {
    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }
}

/// 分類ごとの色
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub at_known_best: Rgb,
    pub new_best: Rgb,
    pub proven_optimal: Rgb,
    /// 1番目の手法が勝つ場合の塗り（Strong, Moderate, Weak）
    pub first_better: [Rgb; 3],
    /// 2番目の手法が勝つ場合の塗り（Strong, Moderate, Weak）
    pub second_better: [Rgb; 3],
    pub header_fill: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            at_known_best: Rgb(0xFF, 0x00, 0x00),
            new_best: Rgb(0x00, 0xFF, 0x00),
            proven_optimal: Rgb(0x00, 0x00, 0xFF),
            first_better: [Rgb(0x63, 0xBE, 0x7B), Rgb(0xA9, 0xD0, 0x8E), Rgb(0xE2, 0xEF, 0xDA)],
            second_better: [Rgb(0xF8, 0x69, 0x6B), Rgb(0xF4, 0xB0, 0x84), Rgb(0xFC, 0xE4, 0xD6)],
            header_fill: Rgb(0xD9, 0xD9, 0xD9),
        }
    }
}

fn shade(strength: Strength) -> usize {
    match strength {
        Strength::Strong => 0,
        Strength::Moderate => 1,
        Strength::Weak => 2,
    }
}

impl Palette {
    pub fn gap_fill(&self, tier: GapTier) -> Option<Rgb> {
        match tier {
            GapTier::Neutral => None,
            GapTier::FirstBetter(s) => Some(self.first_better[shade(s)]),
            GapTier::SecondBetter(s) => Some(self.second_better[shade(s)]),
        }
    }
}
