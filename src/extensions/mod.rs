//! Decorative SVG add-ons layered over the engine's output.
//!
//! Nothing here touches the engine contract; these produce defs strings and
//! CSS variables the host injects around the chart surface.

pub mod gradient;
pub mod markers;

pub use gradient::{
    GradientStop, default_gradient_stops, gradient_defs, gradient_fill, gradient_id,
};
pub use markers::{MarkerShape, MarkerSheet, MarkerStyle, marker_css_vars, marker_defs};
