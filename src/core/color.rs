//! Category color resolution.

use crate::core::category::{CategoryColor, CategoryMap, CategoryStyle};

/// Color for data whose category has no entry at all; charts that resolve
/// colors per datum (bubble, gantt) fall back to this.
pub const MISSING_CATEGORY_COLOR: &str = "#cccccc";

/// Palette placeholder for category `index`; the host theme resolves it.
#[must_use]
pub fn palette_placeholder(index: usize) -> String {
    format!("var(--vis-color{index})")
}

/// Collapses a category color to one string: the single color, the first
/// ramp entry, or `fallback` when absent (including an empty ramp).
#[must_use]
pub fn normalize_color(color: Option<&CategoryColor>, fallback: &str) -> String {
    color
        .and_then(CategoryColor::primary)
        .map_or_else(|| fallback.to_owned(), str::to_owned)
}

/// Resolves the color for the category at `index`, placeholder on miss.
#[must_use]
pub fn category_color(style: Option<&CategoryStyle>, index: usize) -> String {
    style
        .and_then(|style| style.color.as_ref())
        .and_then(CategoryColor::primary)
        .map_or_else(|| palette_placeholder(index), str::to_owned)
}

/// One color per category, in map order.
///
/// Ramps collapse to their primary entry. Categories without an explicit
/// color fall back to the theme palette placeholder for their index.
#[must_use]
pub fn extract_colors(categories: &CategoryMap) -> Vec<String> {
    categories
        .iter()
        .enumerate()
        .map(|(index, (_, style))| category_color(Some(style), index))
        .collect()
}
