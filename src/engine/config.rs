//! Engine-facing config types, one tagged variant per drawable kind.
//!
//! These are the values handed to [`VisEngine`](crate::engine::VisEngine)
//! methods. They carry accessor closures, so unlike the chart-level input
//! configs they are not serializable; views re-derive them in full on every
//! sync rather than patching fields.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::accessor::{ColorAccessor, IndexedAccessor, NumericAccessor, TextAccessor};
use crate::core::format::TickFormatterFn;
use crate::core::legend::{LegendAlignment, LegendItem};
use crate::engine::selectors::Selector;
use crate::engine::{DrawableId, DrawableKind};

/// Interpolation applied between adjacent points of an area or line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveKind {
    Linear,
    #[default]
    MonotoneX,
    Basis,
    StepAfter,
}

/// Bar growth direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Edge placement for axes and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    Top,
    Right,
    Bottom,
    Left,
}

/// Which scale an axis drawable reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    X,
    Y,
}

/// Full or half donut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DonutShape {
    #[default]
    Full,
    Half,
}

impl DonutShape {
    /// Half donuts span the upper semicircle; full ones use the engine's
    /// default full sweep.
    #[must_use]
    pub fn angle_range(self) -> Option<(f64, f64)> {
        match self {
            Self::Full => None,
            Self::Half => Some((-FRAC_PI_2, FRAC_PI_2)),
        }
    }
}

/// Inner padding of a container, clockwise from the top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Stacked area series: one y accessor and color per category, in map order.
pub struct AreaConfig<T> {
    pub x: IndexedAccessor<T>,
    pub y: Vec<NumericAccessor<T>>,
    pub colors: Vec<String>,
    pub curve: CurveKind,
    pub opacity: f64,
}

/// Line series; stacked overlays pass cumulative y accessors so each line
/// traces the top edge of the stack below it.
pub struct LineConfig<T> {
    pub x: IndexedAccessor<T>,
    pub y: Vec<NumericAccessor<T>>,
    pub colors: Vec<String>,
    pub curve: CurveKind,
    pub width: f64,
    /// Per-series dash pattern; `None` draws solid.
    pub dash: Vec<Option<Vec<f64>>>,
}

/// Grouped or stacked bars; the [`DrawableConfig`] variant picks which.
pub struct BarConfig<T> {
    pub x: IndexedAccessor<T>,
    pub y: Vec<NumericAccessor<T>>,
    pub colors: Vec<String>,
    pub orientation: Orientation,
    pub group_padding: f64,
    pub bar_padding: f64,
    pub rounded_corners: f64,
}

/// Donut segments; the value accessor reads one segment magnitude per row.
pub struct DonutConfig<T> {
    pub value: NumericAccessor<T>,
    pub colors: Vec<String>,
    pub arc_width: f64,
    pub corner_radius: f64,
    pub pad_angle: f64,
    pub angle_range: Option<(f64, f64)>,
}

/// Scatter points sized and colored per datum.
pub struct ScatterConfig<T> {
    pub x: NumericAccessor<T>,
    pub y: NumericAccessor<T>,
    pub size: NumericAccessor<T>,
    pub color: ColorAccessor<T>,
    pub label: Option<TextAccessor<T>>,
    pub size_range: (f64, f64),
    pub label_position: Position,
    pub cursor: Option<String>,
}

/// Timeline rows: a start, a length, and a category per row.
pub struct TimelineConfig<T> {
    pub x: NumericAccessor<T>,
    pub length: NumericAccessor<T>,
    pub row_kind: TextAccessor<T>,
    pub color: ColorAccessor<T>,
    pub row_height: f64,
    pub line_width: f64,
    pub show_labels: bool,
    pub max_label_width: f64,
}

/// Free-standing value labels, e.g. totals above bars.
pub struct LabelsConfig<T> {
    pub x: IndexedAccessor<T>,
    pub y: IndexedAccessor<T>,
    pub text: TextAccessor<T>,
    pub color: Option<String>,
}

/// Axis drawable config; axes are constructed and reconfigured exactly like
/// series drawables.
pub struct AxisConfig {
    pub kind: AxisKind,
    pub position: Position,
    pub label: Option<String>,
    pub label_margin: Option<f64>,
    pub num_ticks: Option<usize>,
    pub tick_values: Option<Vec<f64>>,
    pub tick_format: Option<TickFormatterFn>,
    pub grid_line: bool,
    pub domain_line: bool,
    pub tick_line: bool,
    pub min_max_ticks_only: bool,
}

impl AxisConfig {
    /// Axis with the conventional edge for its kind and everything else off.
    #[must_use]
    pub fn new(kind: AxisKind) -> Self {
        Self {
            kind,
            position: match kind {
                AxisKind::X => Position::Bottom,
                AxisKind::Y => Position::Left,
            },
            label: None,
            label_margin: None,
            num_ticks: None,
            tick_values: None,
            tick_format: None,
            grid_line: false,
            domain_line: false,
            tick_line: false,
            min_max_ticks_only: false,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_num_ticks(mut self, ticks: usize) -> Self {
        self.num_ticks = Some(ticks);
        self
    }
}

/// One engine drawable config, tagged by kind so a config shape can never
/// reach the wrong primitive constructor.
pub enum DrawableConfig<T> {
    Area(AreaConfig<T>),
    Line(LineConfig<T>),
    GroupedBar(BarConfig<T>),
    StackedBar(BarConfig<T>),
    Donut(DonutConfig<T>),
    Scatter(ScatterConfig<T>),
    Timeline(TimelineConfig<T>),
    Labels(LabelsConfig<T>),
    Axis(AxisConfig),
}

impl<T> DrawableConfig<T> {
    #[must_use]
    pub const fn kind(&self) -> DrawableKind {
        match self {
            Self::Area(_) => DrawableKind::Area,
            Self::Line(_) => DrawableKind::Line,
            Self::GroupedBar(_) => DrawableKind::GroupedBar,
            Self::StackedBar(_) => DrawableKind::StackedBar,
            Self::Donut(_) => DrawableKind::Donut,
            Self::Scatter(_) => DrawableKind::Scatter,
            Self::Timeline(_) => DrawableKind::Timeline,
            Self::Labels(_) => DrawableKind::Labels,
            Self::Axis(_) => DrawableKind::Axis,
        }
    }
}

/// Produces tooltip markup for the hovered row, or `None` to stay hidden.
pub type TooltipTemplateFn<T> = Arc<dyn Fn(&T, usize) -> Option<String> + Send + Sync + 'static>;

/// Tooltip wiring: one template per drawable selector it should follow.
pub struct TooltipConfig<T> {
    pub triggers: Vec<(Selector, TooltipTemplateFn<T>)>,
    pub horizontal_placement: Option<Position>,
    pub vertical_placement: Option<Position>,
    pub horizontal_shift: f64,
    pub vertical_shift: f64,
}

impl<T> TooltipConfig<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            triggers: Vec::new(),
            horizontal_placement: None,
            vertical_placement: None,
            horizontal_shift: 0.0,
            vertical_shift: 0.0,
        }
    }

    #[must_use]
    pub fn with_trigger(mut self, selector: Selector, template: TooltipTemplateFn<T>) -> Self {
        self.triggers.push((selector, template));
        self
    }

    #[must_use]
    pub fn with_placement(mut self, horizontal: Position, vertical: Position) -> Self {
        self.horizontal_placement = Some(horizontal);
        self.vertical_placement = Some(vertical);
        self
    }

    #[must_use]
    pub fn with_shifts(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_shift = horizontal;
        self.vertical_shift = vertical;
        self
    }
}

impl<T> Default for TooltipConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Crosshair wiring; only the content template is configurable.
pub struct CrosshairConfig<T> {
    pub template: TooltipTemplateFn<T>,
}

/// Legend content plus bullet-row alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendConfig {
    pub items: Vec<LegendItem>,
    pub alignment: LegendAlignment,
}

/// Full container config: the drawables it hosts, scale domains, and the
/// embedded tooltip/crosshair slots.
pub struct ContainerConfig<T> {
    pub height: Option<f64>,
    pub padding: Option<Padding>,
    pub x_domain: Option<(f64, f64)>,
    pub y_domain: Option<(f64, f64)>,
    pub components: SmallVec<[DrawableId; 4]>,
    pub x_axis: Option<DrawableId>,
    pub y_axis: Option<DrawableId>,
    pub scale_by_domain: bool,
    pub tooltip: Option<TooltipConfig<T>>,
    pub crosshair: Option<CrosshairConfig<T>>,
}

impl<T> ContainerConfig<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            height: None,
            padding: None,
            x_domain: None,
            y_domain: None,
            components: SmallVec::new(),
            x_axis: None,
            y_axis: None,
            scale_by_domain: false,
            tooltip: None,
            crosshair: None,
        }
    }

    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    #[must_use]
    pub fn with_component(mut self, id: DrawableId) -> Self {
        self.components.push(id);
        self
    }
}

impl<T> Default for ContainerConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_donuts_span_the_upper_semicircle() {
        let (start, end) = DonutShape::Half.angle_range().unwrap();
        assert_eq!(start, -FRAC_PI_2);
        assert_eq!(end, FRAC_PI_2);
        assert!(DonutShape::Full.angle_range().is_none());
    }

    #[test]
    fn axes_default_to_the_conventional_edge() {
        assert_eq!(AxisConfig::new(AxisKind::X).position, Position::Bottom);
        assert_eq!(AxisConfig::new(AxisKind::Y).position, Position::Left);
        assert!(!AxisConfig::new(AxisKind::X).grid_line);
    }

    #[test]
    fn drawable_configs_report_their_kind() {
        let axis: DrawableConfig<()> = DrawableConfig::Axis(AxisConfig::new(AxisKind::Y));
        assert_eq!(axis.kind(), DrawableKind::Axis);
    }

    #[test]
    fn curve_kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&CurveKind::MonotoneX).unwrap(),
            "\"monotone-x\"",
        );
    }
}
