//! Line chart view: one solid line per category over shared axes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::api::signature::{joined_keys, LineSignature};
use crate::api::sync::{decide, BuildState, SyncAction};
use crate::api::tooltip::{tooltip_html, TitleFormatterFn};
use crate::api::{sync_legend, ChartEvent, ChartHost, HoverSlot};
use crate::core::accessor::{index_x, series_accessor};
use crate::core::category::CategoryMap;
use crate::core::color::extract_colors;
use crate::core::datum::Datum;
use crate::core::format::{Tick, TickFormatterFn, ValueFormatterFn};
use crate::core::legend::{legend_items, LegendPosition};
use crate::engine::config::{
    AxisConfig, AxisKind, ContainerConfig, CrosshairConfig, CurveKind, DrawableConfig,
    LegendConfig, LineConfig, Padding, Position, TooltipConfig, TooltipTemplateFn,
};
use crate::engine::{ContainerId, DrawableId, LegendId, Surface, VisEngine};
use crate::error::ChartResult;

fn default_height() -> f64 {
    400.0
}

fn default_padding() -> Padding {
    Padding::new(5.0, 5.0, 30.0, 40.0)
}

fn default_line_width() -> f64 {
    2.0
}

/// Plain-data inputs of a [`LineChart`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChartConfig {
    pub categories: CategoryMap,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_padding")]
    pub padding: Padding,
    #[serde(default)]
    pub curve: CurveKind,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Per-series dash patterns, indexed like the category map.
    #[serde(default)]
    pub line_dash: Vec<Option<Vec<f64>>>,
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
    #[serde(default)]
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
    pub x_domain: Option<(f64, f64)>,
    #[serde(default)]
    pub y_domain: Option<(f64, f64)>,
    #[serde(default)]
    pub hide_tooltip: bool,
    #[serde(default)]
    pub hide_legend: bool,
    #[serde(default)]
    pub legend_position: LegendPosition,
}

impl LineChartConfig {
    /// Config with library defaults for every knob except the categories.
    #[must_use]
    pub fn new(categories: CategoryMap) -> Self {
        Self {
            categories,
            height: default_height(),
            padding: default_padding(),
            curve: CurveKind::default(),
            line_width: default_line_width(),
            line_dash: Vec::new(),
            x_label: None,
            y_label: None,
            x_num_ticks: None,
            y_num_ticks: None,
            x_explicit_ticks: None,
            min_max_ticks_only: false,
            x_grid_line: false,
            y_grid_line: false,
            x_domain_line: false,
            y_domain_line: false,
            x_tick_line: false,
            y_tick_line: false,
            hide_x_axis: false,
            hide_y_axis: false,
            x_domain: None,
            y_domain: None,
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
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn with_curve(mut self, curve: CurveKind) -> Self {
        self.curve = curve;
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    #[must_use]
    pub fn with_legend_position(mut self, position: LegendPosition) -> Self {
        self.legend_position = position;
        self
    }
}

/// Line chart over rows of `T`, rendered through engine `E`.
pub struct LineChart<T, E: VisEngine<T>> {
    engine: E,
    config: LineChartConfig,
    state: BuildState<LineSignature>,
    container: Option<ContainerId>,
    lines: SmallVec<[DrawableId; 4]>,
    x_axis: Option<DrawableId>,
    y_axis: Option<DrawableId>,
    legend: Option<LegendId>,
    hover: HoverSlot<T>,
    title_formatter: Option<TitleFormatterFn<T>>,
    value_formatter: Option<ValueFormatterFn>,
    x_formatter: Option<TickFormatterFn>,
    y_formatter: Option<TickFormatterFn>,
}

impl<T, E: VisEngine<T>> LineChart<T, E> {
    #[must_use]
    pub fn new(engine: E, config: LineChartConfig) -> Self {
        Self {
            engine,
            config,
            state: BuildState::Unbuilt,
            container: None,
            lines: SmallVec::new(),
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
    pub fn config(&self) -> &LineChartConfig {
        &self.config
    }

    /// Replaces the inputs; the change lands on the next [`sync`](Self::sync).
    pub fn set_config(&mut self, config: LineChartConfig) {
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
    pub fn state(&self) -> &BuildState<LineSignature> {
        &self.state
    }

    /// The structural shape of the current inputs; any change forces a
    /// rebuild on the next sync.
    #[must_use]
    pub fn structural_signature(&self) -> LineSignature {
        LineSignature {
            category_keys: joined_keys(&self.config.categories),
            hide_x_axis: self.config.hide_x_axis,
            hide_y_axis: self.config.hide_y_axis,
            hide_tooltip: self.config.hide_tooltip,
        }
    }

    pub fn set_title_formatter(&mut self, formatter: TitleFormatterFn<T>) {
        self.title_formatter = Some(formatter);
    }

    pub fn set_value_formatter(&mut self, formatter: ValueFormatterFn) {
        self.value_formatter = Some(formatter);
    }

    pub fn set_x_formatter(&mut self, formatter: TickFormatterFn) {
        self.x_formatter = Some(formatter);
    }

    pub fn set_y_formatter(&mut self, formatter: TickFormatterFn) {
        self.y_formatter = Some(formatter);
    }

    /// The row currently under the crosshair, if any.
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
        trace!("releasing line chart");
        self.teardown()?;
        self.state = BuildState::Released;
        Ok(())
    }

    fn teardown(&mut self) -> ChartResult<()> {
        if let Some(id) = self.container.take() {
            self.engine.destroy_container(id)?;
        }
        for id in self.lines.drain(..) {
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

impl<T, E> LineChart<T, E>
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
        debug!(?action, rows = data.len(), "line chart sync");
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
        let keys = self.config.categories.key_vec();
        let colors = extract_colors(&self.config.categories);
        trace!(series = keys.len(), "constructing line chart");

        for index in 0..keys.len() {
            let line = self.series_line_config(index, &keys, &colors);
            self.lines
                .push(self.engine.create_drawable(DrawableConfig::Line(line))?);
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
        let keys = self.config.categories.key_vec();
        let colors = extract_colors(&self.config.categories);

        for index in 0..keys.len() {
            let Some(line) = self.lines.get(index).copied() else {
                continue;
            };
            let config = self.series_line_config(index, &keys, &colors);
            self.engine
                .update_drawable(line, DrawableConfig::Line(config))?;
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

    fn series_line_config(&self, index: usize, keys: &[String], colors: &[String]) -> LineConfig<T> {
        LineConfig {
            x: index_x(),
            y: vec![series_accessor(keys[index].clone())],
            colors: vec![colors[index].clone()],
            curve: self.config.curve,
            width: self.config.line_width,
            dash: vec![self.config.line_dash.get(index).cloned().flatten()],
        }
    }

    fn x_axis_config(&self) -> AxisConfig {
        AxisConfig {
            label: self.config.x_label.clone(),
            label_margin: Some(8.0),
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
        AxisConfig {
            label: self.config.y_label.clone(),
            num_ticks: self.config.y_num_ticks,
            tick_format: self.y_formatter.clone(),
            grid_line: self.config.y_grid_line,
            domain_line: self.config.y_domain_line,
            tick_line: self.config.y_tick_line,
            ..AxisConfig::new(AxisKind::Y)
        }
    }

    fn container_config(&self) -> ContainerConfig<T> {
        let mut components: SmallVec<[DrawableId; 4]> = SmallVec::new();
        components.extend(self.lines.iter().copied());
        let (tooltip, crosshair) = if self.config.hide_tooltip {
            (None, None)
        } else {
            (
                Some(TooltipConfig::new().with_placement(Position::Right, Position::Top)),
                Some(CrosshairConfig {
                    template: self.crosshair_template(),
                }),
            )
        };
        ContainerConfig {
            height: Some(self.config.height),
            padding: Some(self.config.padding),
            x_domain: self.config.x_domain,
            y_domain: self.config.y_domain,
            components,
            x_axis: self.x_axis,
            y_axis: self.y_axis,
            scale_by_domain: false,
            tooltip,
            crosshair,
        }
    }

    /// Tooltip values go through the explicit override when set, otherwise
    /// through the y-axis tick formatter.
    fn tooltip_value_formatter(&self) -> Option<ValueFormatterFn> {
        if let Some(formatter) = self.value_formatter.clone() {
            return Some(formatter);
        }
        let tick_formatter = self.y_formatter.clone()?;
        Some(Arc::new(move |value| {
            tick_formatter(Tick::Number(value), 0, &[])
        }))
    }

    fn crosshair_template(&self) -> TooltipTemplateFn<T> {
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

impl<T, E: VisEngine<T>> Drop for LineChart<T, E> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
