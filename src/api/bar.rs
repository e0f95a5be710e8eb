//! Bar chart view: grouped or stacked bars in either orientation.
//!
//! Unlike the area and line views, a bar chart draws exactly one series
//! drawable. The stacked flag selects between the grouped and stacked bar
//! primitives, which is a structural choice: flipping it rebuilds the chart
//! so the container never holds the wrong primitive kind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::api::signature::{joined_keys, BarSignature};
use crate::api::sync::{decide, BuildState, SyncAction};
use crate::api::tooltip::{tooltip_html, TitleFormatterFn};
use crate::api::{sync_legend, ChartEvent, ChartHost, HoverSlot};
use crate::core::accessor::{index_x, series_accessors, IndexedAccessor};
use crate::core::category::CategoryMap;
use crate::core::color::extract_colors;
use crate::core::datum::Datum;
use crate::core::format::{Tick, TickFormatterFn, ValueFormatterFn};
use crate::core::legend::{legend_items, LegendPosition};
use crate::engine::config::{
    AxisConfig, AxisKind, BarConfig, ContainerConfig, DrawableConfig, LabelsConfig, LegendConfig,
    Orientation, Padding, TooltipConfig, TooltipTemplateFn,
};
use crate::engine::selectors::Selector;
use crate::engine::{ContainerId, DrawableId, LegendId, Surface, VisEngine};
use crate::error::ChartResult;

fn default_height() -> f64 {
    400.0
}

fn default_padding() -> Padding {
    Padding::uniform(5.0)
}

fn default_bar_padding() -> f64 {
    0.2
}

fn default_y_grid_line() -> bool {
    true
}

/// Value labels drawn at the end of each bar.
///
/// The label text is the row total across the chart's value keys, formatted
/// with the effective tooltip value formatter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueLabels {
    #[serde(default)]
    pub show: bool,
    #[serde(default)]
    pub color: Option<String>,
}

/// Plain-data inputs of a [`BarChart`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChartConfig {
    pub categories: CategoryMap,
    /// Row fields plotted as bars, one per series.
    pub value_keys: Vec<String>,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_padding")]
    pub padding: Padding,
    #[serde(default)]
    pub stacked: bool,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub corner_radius: f64,
    /// Spacing between bar groups, 0..=1. Grouped mode only.
    #[serde(default)]
    pub group_padding: f64,
    /// Spacing between bars within a group, 0..=1.
    #[serde(default = "default_bar_padding")]
    pub bar_padding: f64,
    #[serde(default)]
    pub value_labels: Option<ValueLabels>,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    #[serde(default)]
    pub x_num_ticks: Option<usize>,
    #[serde(default)]
    pub y_num_ticks: Option<usize>,
    #[serde(default)]
    pub x_explicit_ticks: Option<Vec<f64>>,
    #[serde(default)]
    pub min_max_ticks_only: bool,
    #[serde(default)]
    pub x_grid_line: bool,
    #[serde(default = "default_y_grid_line")]
    pub y_grid_line: bool,
    #[serde(default)]
    pub x_domain_line: bool,
    #[serde(default)]
    pub y_domain_line: bool,
    #[serde(default)]
    pub x_tick_line: bool,
    #[serde(default)]
    pub y_tick_line: bool,
    #[serde(default)]
    pub hide_x_axis: bool,
    #[serde(default)]
    pub hide_y_axis: bool,
    #[serde(default)]
    pub hide_tooltip: bool,
    #[serde(default)]
    pub hide_legend: bool,
    #[serde(default)]
    pub legend_position: LegendPosition,
}

impl BarChartConfig {
    /// Config with library defaults for every knob except the categories and
    /// the value keys.
    #[must_use]
    pub fn new(categories: CategoryMap, value_keys: Vec<String>) -> Self {
        Self {
            categories,
            value_keys,
            height: default_height(),
            padding: default_padding(),
            stacked: false,
            orientation: Orientation::default(),
            corner_radius: 0.0,
            group_padding: 0.0,
            bar_padding: default_bar_padding(),
            value_labels: None,
            x_label: None,
            y_label: None,
            x_num_ticks: None,
            y_num_ticks: None,
            x_explicit_ticks: None,
            min_max_ticks_only: false,
            x_grid_line: false,
            y_grid_line: default_y_grid_line(),
            x_domain_line: false,
            y_domain_line: false,
            x_tick_line: false,
            y_tick_line: false,
            hide_x_axis: false,
            hide_y_axis: false,
            hide_tooltip: false,
            hide_legend: false,
            legend_position: LegendPosition::default(),
        }
    }

    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_stacked(mut self, stacked: bool) -> Self {
        self.stacked = stacked;
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    #[must_use]
    pub fn with_value_labels(mut self, labels: ValueLabels) -> Self {
        self.value_labels = Some(labels);
        self
    }

    #[must_use]
    pub fn with_legend_position(mut self, position: LegendPosition) -> Self {
        self.legend_position = position;
        self
    }
}

/// Bar chart over rows of `T`, rendered through engine `E`.
pub struct BarChart<T, E: VisEngine<T>> {
    engine: E,
    config: BarChartConfig,
    state: BuildState<BarSignature>,
    container: Option<ContainerId>,
    bars: Option<DrawableId>,
    labels: Option<DrawableId>,
    x_axis: Option<DrawableId>,
    y_axis: Option<DrawableId>,
    legend: Option<LegendId>,
    hover: HoverSlot<T>,
    title_formatter: Option<TitleFormatterFn<T>>,
    value_formatter: Option<ValueFormatterFn>,
    x_formatter: Option<TickFormatterFn>,
    y_formatter: Option<TickFormatterFn>,
}

impl<T, E: VisEngine<T>> BarChart<T, E> {
    #[must_use]
    pub fn new(engine: E, config: BarChartConfig) -> Self {
        Self {
            engine,
            config,
            state: BuildState::Unbuilt,
            container: None,
            bars: None,
            labels: None,
            x_axis: None,
            y_axis: None,
            legend: None,
            hover: HoverSlot::new(),
            title_formatter: None,
            value_formatter: None,
            x_formatter: None,
            y_formatter: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BarChartConfig {
        &self.config
    }

    /// Replaces the inputs; the change lands on the next [`sync`](Self::sync).
    pub fn set_config(&mut self, config: BarChartConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn container(&self) -> Option<ContainerId> {
        self.container
    }

    #[must_use]
    pub fn state(&self) -> &BuildState<BarSignature> {
        &self.state
    }

    /// The structural shape of the current inputs; any change forces a
    /// rebuild on the next sync.
    #[must_use]
    pub fn structural_signature(&self) -> BarSignature {
        BarSignature {
            stacked: self.config.stacked,
            category_keys: joined_keys(&self.config.categories),
            value_keys: self.config.value_keys.join(","),
            hide_x_axis: self.config.hide_x_axis,
            hide_y_axis: self.config.hide_y_axis,
            hide_tooltip: self.config.hide_tooltip,
            orientation: self.config.orientation,
        }
    }

    pub fn set_title_formatter(&mut self, formatter: TitleFormatterFn<T>) {
        self.title_formatter = Some(formatter);
    }

    /// Overrides the tooltip value formatter. Without an override the axis
    /// formatter for the value scale is used: the y formatter, or the x
    /// formatter when the bars run horizontally.
    pub fn set_value_formatter(&mut self, formatter: ValueFormatterFn) {
        self.value_formatter = Some(formatter);
    }

    pub fn set_x_formatter(&mut self, formatter: TickFormatterFn) {
        self.x_formatter = Some(formatter);
    }

    pub fn set_y_formatter(&mut self, formatter: TickFormatterFn) {
        self.y_formatter = Some(formatter);
    }

    /// The row currently hovered over a bar, if any.
    #[must_use]
    pub fn hovered(&self) -> Option<(usize, T)>
    where
        T: Clone,
    {
        self.hover.get()
    }

    /// Click payload: the hovered row at click time.
    #[must_use]
    pub fn on_click(&self) -> Option<ChartEvent<T>>
    where
        T: Clone,
    {
        self.hover
            .get()
            .map(|(index, row)| ChartEvent { row, index })
    }

    /// Destroys every engine object this view owns and seals the view.
    pub fn release(&mut self) -> ChartResult<()> {
        if self.state.is_released() {
            return Ok(());
        }
        trace!("releasing bar chart");
        self.teardown()?;
        self.state = BuildState::Released;
        Ok(())
    }

    fn teardown(&mut self) -> ChartResult<()> {
        if let Some(id) = self.container.take() {
            self.engine.destroy_container(id)?;
        }
        if let Some(id) = self.bars.take() {
            self.engine.destroy_drawable(id)?;
        }
        if let Some(id) = self.labels.take() {
            self.engine.destroy_drawable(id)?;
        }
        if let Some(id) = self.x_axis.take() {
            self.engine.destroy_drawable(id)?;
        }
        if let Some(id) = self.y_axis.take() {
            self.engine.destroy_drawable(id)?;
        }
        if let Some(id) = self.legend.take() {
            self.engine.destroy_legend(id)?;
        }
        self.hover.clear();
        Ok(())
    }
}

impl<T, E> BarChart<T, E>
where
    T: Datum + Clone + Send + 'static,
    E: VisEngine<T>,
{
    /// Reconciles the chart against the host surfaces and current inputs,
    /// returning the action taken.
    pub fn sync(&mut self, host: &ChartHost, data: &[T]) -> ChartResult<SyncAction> {
        let signature = self.structural_signature();
        let surface = host
            .chart_surface()
            .filter(|_| self.engine.is_interactive());
        let action = decide(surface.is_some(), &self.state, &signature);
        debug!(?action, rows = data.len(), "bar chart sync");
        match (action, surface) {
            (SyncAction::Construct, Some(surface)) => {
                self.construct(surface, data)?;
                self.state = BuildState::Built(signature);
            }
            (SyncAction::Rebuild, Some(surface)) => {
                self.teardown()?;
                self.construct(surface, data)?;
                self.state = BuildState::Built(signature);
            }
            (SyncAction::Refresh, _) => self.refresh(data)?,
            _ => {}
        }
        if !self.state.is_released() && self.engine.is_interactive() {
            let config = self.legend_config();
            sync_legend(
                &mut self.engine,
                host.legend,
                self.config.hide_legend,
                &mut self.legend,
                config,
            )?;
        }
        Ok(action)
    }

    fn construct(&mut self, surface: Surface, data: &[T]) -> ChartResult<()> {
        trace!(
            stacked = self.config.stacked,
            orientation = ?self.config.orientation,
            "constructing bar chart"
        );

        let bars = self.bar_drawable_config();
        self.bars = Some(self.engine.create_drawable(bars)?);

        if self.labels_enabled() {
            let labels = self.labels_config();
            self.labels = Some(self.engine.create_drawable(DrawableConfig::Labels(labels))?);
        }

        if !self.config.hide_x_axis {
            let axis = self.x_axis_config();
            self.x_axis = Some(self.engine.create_drawable(DrawableConfig::Axis(axis))?);
        }
        if !self.config.hide_y_axis {
            let axis = self.y_axis_config();
            self.y_axis = Some(self.engine.create_drawable(DrawableConfig::Axis(axis))?);
        }

        let container = self.container_config();
        self.container = Some(self.engine.mount_container(surface, container, data)?);
        Ok(())
    }

    fn refresh(&mut self, data: &[T]) -> ChartResult<()> {
        if let Some(id) = self.bars {
            let config = self.bar_drawable_config();
            self.engine.update_drawable(id, config)?;
        }
        if let Some(id) = self.labels {
            let config = self.labels_config();
            self.engine
                .update_drawable(id, DrawableConfig::Labels(config))?;
        }
        if let Some(id) = self.x_axis {
            let axis = self.x_axis_config();
            self.engine
                .update_drawable(id, DrawableConfig::Axis(axis))?;
        }
        if let Some(id) = self.y_axis {
            let axis = self.y_axis_config();
            self.engine
                .update_drawable(id, DrawableConfig::Axis(axis))?;
        }
        if let Some(id) = self.container {
            let config = self.container_config();
            self.engine.update_container(id, config)?;
            self.engine.set_data(id, data)?;
        }
        Ok(())
    }

    fn bar_drawable_config(&self) -> DrawableConfig<T> {
        let config = BarConfig {
            x: index_x(),
            y: series_accessors(&self.config.value_keys),
            colors: extract_colors(&self.config.categories),
            orientation: self.config.orientation,
            group_padding: self.config.group_padding,
            bar_padding: self.config.bar_padding,
            rounded_corners: self.config.corner_radius,
        };
        if self.config.stacked {
            DrawableConfig::StackedBar(config)
        } else {
            DrawableConfig::GroupedBar(config)
        }
    }

    fn labels_enabled(&self) -> bool {
        self.config
            .value_labels
            .as_ref()
            .is_some_and(|labels| labels.show)
    }

    /// Value labels at the end of each bar: the index along the category
    /// scale and the row total along the value scale, swapped when the bars
    /// run horizontally.
    fn labels_config(&self) -> LabelsConfig<T> {
        let keys = self.config.value_keys.clone();
        let total: IndexedAccessor<T> = Arc::new(move |row: &T, _| {
            keys.iter().map(|key| row.numeric_field(key)).sum::<f64>()
        });
        let index: IndexedAccessor<T> = Arc::new(|_, i| i as f64);
        let (x, y) = match self.config.orientation {
            Orientation::Vertical => (index, total.clone()),
            Orientation::Horizontal => (total.clone(), index),
        };
        let formatter = self.tooltip_value_formatter();
        let shown = self.labels_enabled();
        let text = Arc::new(move |row: &T| {
            if !shown {
                return String::new();
            }
            let value = total(row, 0);
            formatter
                .as_ref()
                .map_or_else(|| value.to_string(), |format| format(value))
        });
        LabelsConfig {
            x,
            y,
            text,
            color: self
                .config
                .value_labels
                .as_ref()
                .and_then(|labels| labels.color.clone()),
        }
    }

    fn x_axis_config(&self) -> AxisConfig {
        AxisConfig {
            label: self.config.x_label.clone(),
            num_ticks: self.config.x_num_ticks,
            tick_values: self.config.x_explicit_ticks.clone(),
            tick_format: self.x_formatter.clone(),
            grid_line: self.config.x_grid_line,
            domain_line: self.config.x_domain_line,
            tick_line: self.config.x_tick_line,
            min_max_ticks_only: self.config.min_max_ticks_only,
            ..AxisConfig::new(AxisKind::X)
        }
    }

    fn y_axis_config(&self) -> AxisConfig {
        // Horizontal bars draw their own row separation; y grid lines only
        // add noise there.
        let grid_line =
            self.config.orientation != Orientation::Horizontal && self.config.y_grid_line;
        AxisConfig {
            label: self.config.y_label.clone(),
            num_ticks: self.config.y_num_ticks,
            tick_format: self.y_formatter.clone(),
            grid_line,
            domain_line: self.config.y_domain_line,
            tick_line: self.config.y_tick_line,
            ..AxisConfig::new(AxisKind::Y)
        }
    }

    fn container_config(&self) -> ContainerConfig<T> {
        let mut components: SmallVec<[DrawableId; 4]> = SmallVec::new();
        components.extend(self.bars);
        components.extend(self.labels);
        let tooltip = if self.config.hide_tooltip {
            None
        } else {
            let template = self.tooltip_template();
            Some(
                TooltipConfig::new()
                    .with_trigger(Selector::GroupedBar, template.clone())
                    .with_trigger(Selector::StackedBar, template),
            )
        };
        ContainerConfig {
            height: Some(self.config.height),
            padding: Some(self.config.padding),
            x_domain: None,
            y_domain: None,
            components,
            x_axis: self.x_axis,
            y_axis: self.y_axis,
            scale_by_domain: false,
            tooltip,
            crosshair: None,
        }
    }

    /// The formatter applied to tooltip values: an explicit override, or the
    /// tick formatter of the value scale.
    fn tooltip_value_formatter(&self) -> Option<ValueFormatterFn> {
        if let Some(formatter) = self.value_formatter.clone() {
            return Some(formatter);
        }
        let tick_formatter = match self.config.orientation {
            Orientation::Horizontal => self.x_formatter.clone(),
            Orientation::Vertical => self.y_formatter.clone(),
        }?;
        Some(Arc::new(move |value| {
            tick_formatter(Tick::Number(value), 0, &[])
        }))
    }

    fn tooltip_template(&self) -> TooltipTemplateFn<T> {
        let hover = self.hover.clone();
        let categories = self.config.categories.clone();
        let title_formatter = self.title_formatter.clone();
        let value_formatter = self.tooltip_value_formatter();
        Arc::new(move |row: &T, index: usize| {
            hover.set(index, row.clone());
            Some(tooltip_html(
                row,
                &categories,
                title_formatter.as_ref(),
                value_formatter.as_ref(),
            ))
        })
    }

    fn legend_config(&self) -> LegendConfig {
        LegendConfig {
            items: legend_items(&self.config.categories),
            alignment: self.config.legend_position.alignment(),
        }
    }
}

impl<T, E: VisEngine<T>> Drop for BarChart<T, E> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
