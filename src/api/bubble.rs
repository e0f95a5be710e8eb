//! Bubble chart view: one scatter point per row, positioned, sized and
//! colored by row fields.
//!
//! Unlike the sibling views the bubble chart has no structural inputs. Once
//! constructed it only refreshes in place, so its build state carries the
//! unit signature and `sync` can never decide to rebuild.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::api::sync::{decide, BuildState, SyncAction};
use crate::api::tooltip::{tooltip_html, TitleFormatterFn};
use crate::api::{sync_legend, ChartEvent, ChartHost, HoverSlot};
use crate::core::accessor::{constant_accessor, ColorAccessor, NumericAccessor};
use crate::core::category::CategoryMap;
use crate::core::color::{normalize_color, MISSING_CATEGORY_COLOR};
use crate::core::datum::Datum;
use crate::core::format::{Tick, TickFormatterFn, ValueFormatterFn};
use crate::core::legend::{legend_items, LegendPosition};
use crate::engine::config::{
    AxisConfig, AxisKind, ContainerConfig, DrawableConfig, LegendConfig, Padding, Position,
    ScatterConfig, TooltipConfig, TooltipTemplateFn,
};
use crate::engine::selectors::Selector;
use crate::engine::{ContainerId, DrawableId, LegendId, Surface, VisEngine};
use crate::error::ChartResult;

/// Point radius range the size accessor maps into, in pixels.
pub const DEFAULT_SIZE_RANGE: (f64, f64) = (1.0, 20.0);

/// Cursor shown over points; bubbles are always clickable.
const POINT_CURSOR: &str = "pointer";

fn default_height() -> f64 {
    600.0
}

fn default_padding() -> Padding {
    Padding::uniform(5.0)
}

fn default_size_range() -> (f64, f64) {
    DEFAULT_SIZE_RANGE
}

fn default_label_position() -> Position {
    Position::Bottom
}

fn default_true() -> bool {
    true
}

/// Plain-data inputs of a [`BubbleChart`].
///
/// The x/y/size accessors live on the view itself since closures do not
/// serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleChartConfig {
    /// Category styles keyed by the values of the [`category_key`] field.
    ///
    /// [`category_key`]: Self::category_key
    #[serde(default)]
    pub categories: CategoryMap,
    /// Row field whose value names the category a point belongs to.
    #[serde(default)]
    pub category_key: Option<String>,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_padding")]
    pub padding: Padding,
    /// Radius range the size accessor output is scaled into.
    #[serde(default = "default_size_range")]
    pub size_range: (f64, f64),
    #[serde(default = "default_label_position")]
    pub label_position: Position,
    #[serde(default = "default_true")]
    pub scale_by_domain: bool,
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
    #[serde(default = "default_true")]
    pub y_grid_line: bool,
    #[serde(default = "default_true")]
    pub x_domain_line: bool,
    #[serde(default = "default_true")]
    pub y_domain_line: bool,
    #[serde(default = "default_true")]
    pub x_tick_line: bool,
    #[serde(default = "default_true")]
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

impl BubbleChartConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            categories: CategoryMap::new(),
            category_key: None,
            height: default_height(),
            padding: default_padding(),
            size_range: default_size_range(),
            label_position: default_label_position(),
            scale_by_domain: true,
            x_label: None,
            y_label: None,
            x_num_ticks: None,
            y_num_ticks: None,
            x_explicit_ticks: None,
            min_max_ticks_only: false,
            x_grid_line: false,
            y_grid_line: true,
            x_domain_line: true,
            y_domain_line: true,
            x_tick_line: true,
            y_tick_line: true,
            hide_x_axis: false,
            hide_y_axis: false,
            hide_tooltip: false,
            hide_legend: false,
            legend_position: LegendPosition::default(),
        }
    }

    #[must_use]
    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn with_category_key(mut self, key: impl Into<String>) -> Self {
        self.category_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_size_range(mut self, min: f64, max: f64) -> Self {
        self.size_range = (min, max);
        self
    }

    #[must_use]
    pub fn with_label_position(mut self, position: Position) -> Self {
        self.label_position = position;
        self
    }

    #[must_use]
    pub fn with_legend_position(mut self, position: LegendPosition) -> Self {
        self.legend_position = position;
        self
    }
}

impl Default for BubbleChartConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bubble chart over rows of `T`, rendered through engine `E`.
pub struct BubbleChart<T, E: VisEngine<T>> {
    engine: E,
    config: BubbleChartConfig,
    x: NumericAccessor<T>,
    y: NumericAccessor<T>,
    size: Option<NumericAccessor<T>>,
    state: BuildState<()>,
    container: Option<ContainerId>,
    scatter: Option<DrawableId>,
    x_axis: Option<DrawableId>,
    y_axis: Option<DrawableId>,
    legend: Option<LegendId>,
    hover: HoverSlot<T>,
    title_formatter: Option<TitleFormatterFn<T>>,
    value_formatter: Option<ValueFormatterFn>,
    x_formatter: Option<TickFormatterFn>,
    y_formatter: Option<TickFormatterFn>,
}

impl<T, E: VisEngine<T>> BubbleChart<T, E> {
    /// The x/y accessors are required; every other input has a default.
    #[must_use]
    pub fn new(
        engine: E,
        config: BubbleChartConfig,
        x: NumericAccessor<T>,
        y: NumericAccessor<T>,
    ) -> Self {
        Self {
            engine,
            config,
            x,
            y,
            size: None,
            state: BuildState::Unbuilt,
            container: None,
            scatter: None,
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
    pub fn config(&self) -> &BubbleChartConfig {
        &self.config
    }

    /// Replaces the inputs; the change lands on the next [`sync`](Self::sync).
    pub fn set_config(&mut self, config: BubbleChartConfig) {
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
    pub fn state(&self) -> &BuildState<()> {
        &self.state
    }

    pub fn set_x_accessor(&mut self, accessor: NumericAccessor<T>) {
        self.x = accessor;
    }

    pub fn set_y_accessor(&mut self, accessor: NumericAccessor<T>) {
        self.y = accessor;
    }

    /// Without a size accessor every point gets the constant size 1.
    pub fn set_size_accessor(&mut self, accessor: NumericAccessor<T>) {
        self.size = Some(accessor);
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

    /// The row currently under the pointer, if any.
    #[must_use]
    pub fn hovered(&self) -> Option<(usize, T)>
    where
        T: Clone,
    {
        self.hover.get()
    }

    /// Click payload: the hovered row at click time, or `None` when the
    /// pointer was outside any point.
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
    /// Further syncs skip; release is idempotent.
    pub fn release(&mut self) -> ChartResult<()> {
        if self.state.is_released() {
            return Ok(());
        }
        trace!("releasing bubble chart");
        self.teardown()?;
        self.state = BuildState::Released;
        Ok(())
    }

    fn teardown(&mut self) -> ChartResult<()> {
        if let Some(id) = self.container.take() {
            self.engine.destroy_container(id)?;
        }
        if let Some(id) = self.scatter.take() {
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

impl<T, E> BubbleChart<T, E>
where
    T: Datum + Clone + Send + 'static,
    E: VisEngine<T>,
{
    /// Reconciles the chart against the host surfaces and current inputs,
    /// returning the action taken.
    ///
    /// With the unit signature the decision is only ever construct, refresh
    /// or skip; input changes all land through the in-place refresh.
    pub fn sync(&mut self, host: &ChartHost, data: &[T]) -> ChartResult<SyncAction> {
        let surface = host
            .chart_surface()
            .filter(|_| self.engine.is_interactive());
        let action = decide(surface.is_some(), &self.state, &());
        debug!(?action, rows = data.len(), "bubble chart sync");
        match (action, surface) {
            (SyncAction::Construct, Some(surface)) => {
                self.construct(surface, data)?;
                self.state = BuildState::Built(());
            }
            (SyncAction::Rebuild, Some(surface)) => {
                self.teardown()?;
                self.construct(surface, data)?;
                self.state = BuildState::Built(());
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
        trace!(rows = data.len(), "constructing bubble chart");
        let scatter = self.scatter_config();
        self.scatter = Some(self.engine.create_drawable(DrawableConfig::Scatter(scatter))?);

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
        if let Some(id) = self.scatter {
            let config = self.scatter_config();
            self.engine
                .update_drawable(id, DrawableConfig::Scatter(config))?;
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

    fn size_accessor(&self) -> NumericAccessor<T> {
        self.size
            .clone()
            .unwrap_or_else(|| constant_accessor(1.0))
    }

    /// Per-row color: the row's category field resolved through the category
    /// map, [`MISSING_CATEGORY_COLOR`] when the key or category is missing.
    ///
    /// With exactly one category defined the lookup uses the category key
    /// itself instead of the row's field value.
    fn color_accessor(&self) -> ColorAccessor<T> {
        let categories = self.config.categories.clone();
        let category_key = self.config.category_key.clone();
        Arc::new(move |row: &T| {
            let Some(key) = category_key.as_deref() else {
                return MISSING_CATEGORY_COLOR.to_owned();
            };
            if categories.is_empty() {
                return MISSING_CATEGORY_COLOR.to_owned();
            }
            let style = if categories.len() == 1 {
                categories.get(key)
            } else {
                row.field(key)
                    .map(|value| value.to_string())
                    .and_then(|value| categories.get(&value))
            };
            normalize_color(
                style.and_then(|style| style.color.as_ref()),
                MISSING_CATEGORY_COLOR,
            )
        })
    }

    fn scatter_config(&self) -> ScatterConfig<T> {
        ScatterConfig {
            x: self.x.clone(),
            y: self.y.clone(),
            size: self.size_accessor(),
            color: self.color_accessor(),
            label: None,
            size_range: self.config.size_range,
            label_position: self.config.label_position,
            cursor: Some(POINT_CURSOR.to_owned()),
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
        components.extend(self.scatter);
        let tooltip = (!self.config.hide_tooltip).then(|| {
            TooltipConfig::new().with_trigger(Selector::ScatterPoint, self.tooltip_template())
        });
        ContainerConfig {
            height: Some(self.config.height),
            padding: Some(self.config.padding),
            x_domain: None,
            y_domain: None,
            components,
            x_axis: self.x_axis,
            y_axis: self.y_axis,
            scale_by_domain: self.config.scale_by_domain,
            tooltip,
            crosshair: None,
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

    /// Tooltip content hook: records the hovered row, then renders the
    /// shared tooltip markup for it.
    fn tooltip_template(&self) -> TooltipTemplateFn<T> {
        let hover = self.hover.clone();
        let categories = self.config.categories.clone();
        let title_formatter = self.title_formatter.clone();
        let value_formatter = self.tooltip_value_formatter();
        Arc::new(move |row: &T, index| {
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

impl<T, E: VisEngine<T>> Drop for BubbleChart<T, E> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
