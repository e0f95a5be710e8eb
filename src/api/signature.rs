//! Structural signatures per chart kind.
//!
//! A signature captures exactly the inputs whose change invalidates the set
//! of live drawables (which instances exist and how many), never inputs that
//! a plain in-place reconfigure can absorb. Equality is derived field
//! equality; the rebuild decision lives in [`crate::api::sync::decide`].

use crate::core::category::CategoryMap;
use crate::engine::config::{DonutShape, Orientation};

/// Category keys joined in map order; XY charts assign drawables
/// positionally, so order is structural.
#[must_use]
pub fn joined_keys(categories: &CategoryMap) -> String {
    categories.key_vec().join(",")
}

/// Category keys joined in sorted order; timeline rows are grouped by key,
/// so only membership is structural.
#[must_use]
pub fn sorted_joined_keys(categories: &CategoryMap) -> String {
    let mut keys = categories.key_vec();
    keys.sort_unstable();
    keys.join(",")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSignature {
    pub category_keys: String,
    pub hide_x_axis: bool,
    pub hide_y_axis: bool,
    pub hide_tooltip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaSignature {
    pub stacked: bool,
    pub category_keys: String,
    pub hide_x_axis: bool,
    pub hide_y_axis: bool,
    pub hide_tooltip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarSignature {
    pub stacked: bool,
    pub category_keys: String,
    pub value_keys: String,
    pub hide_x_axis: bool,
    pub hide_y_axis: bool,
    pub hide_tooltip: bool,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonutSignature {
    pub shape: DonutShape,
    pub hide_tooltip: bool,
    pub hide_legend: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttSignature {
    pub category_keys: String,
    pub hide_tooltip: bool,
    pub hide_legend: bool,
}
