//! Legend placement and item derivation.

use serde::{Deserialize, Serialize};

use crate::core::category::{CategoryColor, CategoryMap};

/// Where the legend row sits relative to the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendPosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
}

/// Horizontal alignment of the legend bullet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendAlignment {
    Start,
    Center,
    End,
}

impl LegendPosition {
    /// Left positions align to the start edge, right to the end.
    #[must_use]
    pub const fn alignment(self) -> LegendAlignment {
        match self {
            Self::TopLeft | Self::BottomLeft => LegendAlignment::Start,
            Self::TopCenter | Self::BottomCenter => LegendAlignment::Center,
            Self::TopRight | Self::BottomRight => LegendAlignment::End,
        }
    }

    /// True when the legend renders above the chart surface.
    #[must_use]
    pub const fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopCenter | Self::TopRight)
    }
}

/// One legend bullet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default)]
    pub inactive: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub pointer: bool,
}

/// One item per category, in map order. A ramp collapses to its first
/// entry; a category without a color keeps `None` so the legend renderer
/// applies its own palette.
#[must_use]
pub fn legend_items(categories: &CategoryMap) -> Vec<LegendItem> {
    categories
        .iter()
        .map(|(_, style)| LegendItem {
            name: style.name.clone(),
            color: style
                .color
                .as_ref()
                .and_then(CategoryColor::primary)
                .map(str::to_owned),
            css_class: style.css_class.clone(),
            inactive: style.inactive,
            hidden: style.hidden,
            pointer: style.pointer,
        })
        .collect()
}
