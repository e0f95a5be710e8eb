//! Gantt chart view: one timeline row per category, bars spanning start and
//! duration.
//!
//! The time axis is always built; hiding it is not an input. The structural
//! signature compares sorted category keys, so reordering the category map
//! refreshes in place instead of rebuilding.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::api::signature::{sorted_joined_keys, GanttSignature};
use crate::api::sync::{decide, BuildState, SyncAction};
use crate::api::tooltip::{tooltip_html, TitleFormatterFn};
use crate::api::{sync_legend, ChartEvent, ChartHost, HoverSlot};
use crate::core::accessor::{ColorAccessor, NumericAccessor, TextAccessor};
use crate::core::category::CategoryMap;
use crate::core::color::category_color;
use crate::core::datum::Datum;
use crate::core::format::{date_tick_formatter, TickFormatterFn, ValueFormatterFn};
use crate::core::legend::{legend_items, LegendPosition};
use crate::engine::config::{
    AxisConfig, AxisKind, ContainerConfig, DrawableConfig, LegendConfig, TimelineConfig,
    TooltipConfig, TooltipTemplateFn,
};
use crate::engine::selectors::Selector;
use crate::engine::{ContainerId, DrawableId, LegendId, Surface, VisEngine};
use crate::error::ChartResult;

/// Called with the hovered row whenever a timeline label raises the tooltip.
pub type LabelHoverFn<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

fn default_label_width() -> f64 {
    220.0
}

fn default_row_height() -> f64 {
    24.0
}

fn default_line_width() -> f64 {
    12.0
}

fn default_legend_position() -> LegendPosition {
    LegendPosition::TopRight
}

fn default_true() -> bool {
    true
}

/// Plain-data inputs of a [`GanttChart`].
///
/// The start/length/kind accessors live on the view itself since closures do
/// not serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttChartConfig {
    /// Category styles keyed by the values the kind accessor produces.
    pub categories: CategoryMap,
    /// Without a height the container sizes to its rows.
    #[serde(default)]
    pub height: Option<f64>,
    /// Width of the label column, in pixels.
    #[serde(default = "default_label_width")]
    pub label_width: f64,
    /// Height of one timeline row, in pixels.
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    /// Thickness of the timeline bars, in pixels.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default = "default_true")]
    pub show_labels: bool,
    #[serde(default)]
    pub x_num_ticks: Option<usize>,
    #[serde(default = "default_true")]
    pub x_grid_line: bool,
    #[serde(default = "default_true")]
    pub x_domain_line: bool,
    #[serde(default = "default_true")]
    pub x_tick_line: bool,
    #[serde(default)]
    pub hide_tooltip: bool,
    #[serde(default)]
    pub hide_legend: bool,
    #[serde(default = "default_legend_position")]
    pub legend_position: LegendPosition,
}

impl GanttChartConfig {
    #[must_use]
    pub fn new(categories: CategoryMap) -> Self {
        Self {
            categories,
            height: None,
            label_width: default_label_width(),
            row_height: default_row_height(),
            line_width: default_line_width(),
            show_labels: true,
            x_num_ticks: None,
            x_grid_line: true,
            x_domain_line: true,
            x_tick_line: true,
            hide_tooltip: false,
            hide_legend: false,
            legend_position: default_legend_position(),
        }
    }

    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_label_width(mut self, width: f64) -> Self {
        self.label_width = width;
        self
    }

    #[must_use]
    pub fn with_row_height(mut self, height: f64) -> Self {
        self.row_height = height;
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    #[must_use]
    pub fn with_show_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    #[must_use]
    pub fn with_legend_position(mut self, position: LegendPosition) -> Self {
        self.legend_position = position;
        self
    }
}

/// Gantt chart over rows of `T`, rendered through engine `E`.
pub struct GanttChart<T, E: VisEngine<T>> {
    engine: E,
    config: GanttChartConfig,
    x: NumericAccessor<T>,
    length: NumericAccessor<T>,
    kind: TextAccessor<T>,
    state: BuildState<GanttSignature>,
    container: Option<ContainerId>,
    timeline: Option<DrawableId>,
    x_axis: Option<DrawableId>,
    legend: Option<LegendId>,
    hover: HoverSlot<T>,
    label_hover: Option<LabelHoverFn<T>>,
    title_formatter: Option<TitleFormatterFn<T>>,
    value_formatter: Option<ValueFormatterFn>,
    x_formatter: Option<TickFormatterFn>,
}

impl<T, E: VisEngine<T>> GanttChart<T, E> {
    /// The start, length and kind accessors are required; every other input
    /// has a default.
    #[must_use]
    pub fn new(
        engine: E,
        config: GanttChartConfig,
        x: NumericAccessor<T>,
        length: NumericAccessor<T>,
        kind: TextAccessor<T>,
    ) -> Self {
        Self {
            engine,
            config,
            x,
            length,
            kind,
            state: BuildState::Unbuilt,
            container: None,
            timeline: None,
            x_axis: None,
            legend: None,
            hover: HoverSlot::new(),
            label_hover: None,
            title_formatter: None,
            value_formatter: None,
            x_formatter: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GanttChartConfig {
        &self.config
    }

    /// Replaces the inputs; the change lands on the next [`sync`](Self::sync).
    pub fn set_config(&mut self, config: GanttChartConfig) {
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
    pub fn state(&self) -> &BuildState<GanttSignature> {
        &self.state
    }

    /// The structural shape of the current inputs; any change forces a
    /// rebuild on the next sync.
    #[must_use]
    pub fn structural_signature(&self) -> GanttSignature {
        GanttSignature {
            category_keys: sorted_joined_keys(&self.config.categories),
            hide_tooltip: self.config.hide_tooltip,
            hide_legend: self.config.hide_legend,
        }
    }

    pub fn set_x_accessor(&mut self, accessor: NumericAccessor<T>) {
        self.x = accessor;
    }

    pub fn set_length_accessor(&mut self, accessor: NumericAccessor<T>) {
        self.length = accessor;
    }

    pub fn set_kind_accessor(&mut self, accessor: TextAccessor<T>) {
        self.kind = accessor;
    }

    /// Registers the hover callback fired from the label tooltip trigger.
    pub fn set_label_hover(&mut self, callback: LabelHoverFn<T>) {
        self.label_hover = Some(callback);
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

    /// Scroll payload for a host wheel event; the delta passes through
    /// untouched so hosts drive their own scrolling.
    #[must_use]
    pub fn on_wheel(&self, delta: f64) -> f64 {
        delta
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
    /// pointer was outside any row.
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
        trace!("releasing gantt chart");
        self.teardown()?;
        self.state = BuildState::Released;
        Ok(())
    }

    fn teardown(&mut self) -> ChartResult<()> {
        if let Some(id) = self.container.take() {
            self.engine.destroy_container(id)?;
        }
        if let Some(id) = self.timeline.take() {
            self.engine.destroy_drawable(id)?;
        }
        if let Some(id) = self.x_axis.take() {
            self.engine.destroy_drawable(id)?;
        }
        if let Some(id) = self.legend.take() {
            self.engine.destroy_legend(id)?;
        }
        self.hover.clear();
        Ok(())
    }
}

impl<T, E> GanttChart<T, E>
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
        debug!(?action, rows = data.len(), "gantt chart sync");
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
        trace!(rows = data.len(), "constructing gantt chart");
        let timeline = self.timeline_config();
        self.timeline = Some(
            self.engine
                .create_drawable(DrawableConfig::Timeline(timeline))?,
        );

        let axis = self.x_axis_config();
        self.x_axis = Some(self.engine.create_drawable(DrawableConfig::Axis(axis))?);

        let container = self.container_config();
        self.container = Some(self.engine.mount_container(surface, container, data)?);
        Ok(())
    }

    fn refresh(&mut self, data: &[T]) -> ChartResult<()> {
        if let Some(id) = self.timeline {
            let config = self.timeline_config();
            self.engine
                .update_drawable(id, DrawableConfig::Timeline(config))?;
        }
        if let Some(id) = self.x_axis {
            let axis = self.x_axis_config();
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

    /// Per-row color: the row's kind resolved through the category map,
    /// theme palette placeholder on miss.
    fn color_accessor(&self) -> ColorAccessor<T> {
        let categories = self.config.categories.clone();
        let kind = self.kind.clone();
        Arc::new(move |row: &T| {
            let name = kind(row);
            let index = categories.index_of(&name).unwrap_or_default();
            category_color(categories.get(&name), index)
        })
    }

    fn timeline_config(&self) -> TimelineConfig<T> {
        TimelineConfig {
            x: self.x.clone(),
            length: self.length.clone(),
            row_kind: self.kind.clone(),
            color: self.color_accessor(),
            row_height: self.config.row_height,
            line_width: self.config.line_width,
            show_labels: self.config.show_labels,
            max_label_width: self.config.label_width,
        }
    }

    /// Time ticks render through the explicit formatter when set, otherwise
    /// through the calendar-date default.
    fn x_axis_config(&self) -> AxisConfig {
        AxisConfig {
            tick_format: Some(
                self.x_formatter
                    .clone()
                    .unwrap_or_else(date_tick_formatter),
            ),
            num_ticks: self.config.x_num_ticks,
            grid_line: self.config.x_grid_line,
            domain_line: self.config.x_domain_line,
            tick_line: self.config.x_tick_line,
            ..AxisConfig::new(AxisKind::X)
        }
    }

    fn container_config(&self) -> ContainerConfig<T> {
        let mut components: SmallVec<[DrawableId; 4]> = SmallVec::new();
        components.extend(self.timeline);
        let tooltip = (!self.config.hide_tooltip).then(|| {
            TooltipConfig::new().with_trigger(Selector::TimelineLabel, self.tooltip_template())
        });
        ContainerConfig {
            height: self.config.height,
            padding: None,
            x_domain: None,
            y_domain: None,
            components,
            x_axis: self.x_axis,
            y_axis: None,
            scale_by_domain: false,
            tooltip,
            crosshair: None,
        }
    }

    /// Tooltip content hook: records the hovered row, raises the label-hover
    /// callback, then renders the shared tooltip markup.
    fn tooltip_template(&self) -> TooltipTemplateFn<T> {
        let hover = self.hover.clone();
        let label_hover = self.label_hover.clone();
        let categories = self.config.categories.clone();
        let title_formatter = self.title_formatter.clone();
        let value_formatter = self.value_formatter.clone();
        Arc::new(move |row: &T, index| {
            hover.set(index, row.clone());
            if let Some(callback) = &label_hover {
                callback(row);
            }
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

impl<T, E: VisEngine<T>> Drop for GanttChart<T, E> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{json, Value};

    use crate::core::accessor::series_accessor;
    use crate::core::category::CategoryStyle;
    use crate::core::color::palette_placeholder;
    use crate::engine::{RecordingEngine, Surface, SurfaceId};

    use super::*;

    fn categories() -> CategoryMap {
        CategoryMap::new()
            .with("build", CategoryStyle::named("Build").with_color("#2563eb"))
            .with("test", CategoryStyle::named("Test").with_color("#60a5fa"))
    }

    fn row(start: f64, duration: f64, kind: &str) -> Value {
        json!({ "start": start, "duration": duration, "kind": kind })
    }

    fn chart(config: GanttChartConfig) -> GanttChart<Value, RecordingEngine<Value>> {
        GanttChart::new(
            RecordingEngine::new(),
            config,
            series_accessor("start"),
            series_accessor("duration"),
            Arc::new(|row: &Value| row.text_field("kind").unwrap_or_default()),
        )
    }

    fn host() -> ChartHost {
        ChartHost::new(Surface::attached(SurfaceId::from_raw(1)))
    }

    #[test]
    fn builds_a_timeline_and_always_a_time_axis() {
        let mut chart = chart(GanttChartConfig::new(categories()));
        let action = chart.sync(&host(), &[row(0.0, 5.0, "build")]).unwrap();
        assert_eq!(action, SyncAction::Construct);
        // timeline + x axis
        assert_eq!(chart.engine().live_drawables(), 2);
        assert_eq!(chart.engine().live_containers(), 1);
    }

    #[test]
    fn reordered_categories_refresh_instead_of_rebuilding() {
        let mut chart = chart(GanttChartConfig::new(categories()));
        chart.sync(&host(), &[row(0.0, 5.0, "build")]).unwrap();
        let reordered = CategoryMap::new()
            .with("test", CategoryStyle::named("Test").with_color("#60a5fa"))
            .with("build", CategoryStyle::named("Build").with_color("#2563eb"));
        let mut config = chart.config().clone();
        config.categories = reordered;
        chart.set_config(config);
        let action = chart.sync(&host(), &[row(0.0, 5.0, "build")]).unwrap();
        assert_eq!(action, SyncAction::Refresh);
    }

    #[test]
    fn every_structural_input_rebuilds() {
        let flips: &[(&str, fn(&mut GanttChartConfig))] = &[
            ("categories", |c| {
                c.categories.insert("deploy", CategoryStyle::named("Deploy"));
            }),
            ("hide_tooltip", |c| c.hide_tooltip = true),
            ("hide_legend", |c| c.hide_legend = true),
        ];
        for (field, flip) in flips {
            let mut chart = chart(GanttChartConfig::new(categories()));
            chart.sync(&host(), &[row(0.0, 5.0, "build")]).unwrap();
            let mut config = chart.config().clone();
            flip(&mut config);
            chart.set_config(config);
            let action = chart.sync(&host(), &[row(0.0, 5.0, "build")]).unwrap();
            assert_eq!(action, SyncAction::Rebuild, "{field} flip");
        }
    }

    #[test]
    fn bar_color_follows_the_row_kind() {
        let mut chart = chart(GanttChartConfig::new(categories()));
        chart.sync(&host(), &[row(0.0, 5.0, "build")]).unwrap();
        let id = chart.timeline.unwrap();
        let Some(DrawableConfig::Timeline(config)) = chart.engine().drawable_config(id) else {
            panic!("timeline drawable missing");
        };
        assert_eq!((config.color)(&row(0.0, 5.0, "test")), "#60a5fa");
        assert_eq!(
            (config.color)(&row(0.0, 5.0, "deploy")),
            palette_placeholder(0)
        );
    }

    #[test]
    fn label_hover_raises_the_callback_and_fills_the_click_payload() {
        let mut chart = chart(GanttChartConfig::new(categories()));
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        chart.set_label_hover(Arc::new(move |row: &Value| {
            let kind = row.text_field("kind").unwrap_or_default();
            sink.lock().unwrap().push(kind);
        }));
        let rows = [row(0.0, 5.0, "build"), row(5.0, 3.0, "test")];
        chart.sync(&host(), &rows).unwrap();
        let container = chart.container().unwrap();
        chart
            .engine()
            .trigger_tooltip(container, Selector::TimelineLabel, 1)
            .unwrap()
            .unwrap();
        assert_eq!(seen.lock().unwrap().as_slice(), ["test"]);
        let event = chart.on_click().unwrap();
        assert_eq!(event.index, 1);
        assert_eq!(chart.on_wheel(120.0), 120.0);
    }

    #[test]
    fn hidden_tooltip_never_registers_a_trigger() {
        let mut config = GanttChartConfig::new(categories());
        config.hide_tooltip = true;
        let mut chart = chart(config);
        chart.sync(&host(), &[row(0.0, 5.0, "build")]).unwrap();
        let container = chart.container().unwrap();
        let html = chart
            .engine()
            .trigger_tooltip(container, Selector::TimelineLabel, 0)
            .unwrap();
        assert_eq!(html, None);
    }
}
