//! Donut chart view over a flat slice of segment values.
//!
//! The view is concrete over `f64` rows: the engine receives the raw values
//! and an identity accessor, and each value pairs positionally with the
//! category at the same index. Hover hands back a [`DonutSlice`] shaped like
//! a one-field row so the shared tooltip machinery renders it unchanged.

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::api::signature::DonutSignature;
use crate::api::sync::{decide, BuildState, SyncAction};
use crate::api::tooltip::{tooltip_html, TitleFormatterFn};
use crate::api::{sync_legend, ChartEvent, ChartHost, HoverSlot};
use crate::core::category::CategoryMap;
use crate::core::color::extract_colors;
use crate::core::datum::{Datum, FieldValue};
use crate::core::format::ValueFormatterFn;
use crate::core::legend::{legend_items, LegendPosition};
use crate::engine::config::{
    ContainerConfig, DonutConfig, DonutShape, DrawableConfig, LegendConfig, TooltipConfig,
    TooltipTemplateFn,
};
use crate::engine::selectors::Selector;
use crate::engine::{ContainerId, DrawableId, LegendId, Surface, VisEngine};
use crate::error::ChartResult;

fn default_height() -> f64 {
    400.0
}

fn default_arc_width() -> f64 {
    20.0
}

const TOOLTIP_SHIFT: f64 = 20.0;

/// Plain-data inputs of a [`DonutChart`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutChartConfig {
    /// One category per segment, paired with the data by index.
    pub categories: CategoryMap,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub shape: DonutShape,
    #[serde(default)]
    pub corner_radius: f64,
    #[serde(default = "default_arc_width")]
    pub arc_width: f64,
    #[serde(default)]
    pub pad_angle: f64,
    #[serde(default)]
    pub hide_tooltip: bool,
    #[serde(default)]
    pub hide_legend: bool,
    #[serde(default)]
    pub legend_position: LegendPosition,
}

impl DonutChartConfig {
    /// Config with library defaults for every knob except the categories.
    #[must_use]
    pub fn new(categories: CategoryMap) -> Self {
        Self {
            categories,
            height: default_height(),
            shape: DonutShape::default(),
            corner_radius: 0.0,
            arc_width: default_arc_width(),
            pad_angle: 0.0,
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
    pub fn with_shape(mut self, shape: DonutShape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn with_arc_width(mut self, width: f64) -> Self {
        self.arc_width = width;
        self
    }

    #[must_use]
    pub fn with_pad_angle(mut self, angle: f64) -> Self {
        self.pad_angle = angle;
        self
    }

    #[must_use]
    pub fn with_legend_position(mut self, position: LegendPosition) -> Self {
        self.legend_position = position;
        self
    }
}

/// The hovered segment, shaped like a row with a `label` field and one
/// value field named after the segment's category.
#[derive(Debug, Clone, PartialEq)]
pub struct DonutSlice {
    pub label: String,
    pub name: String,
    pub value: f64,
}

impl Datum for DonutSlice {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        if key == "label" {
            Some(FieldValue::Text(Cow::Borrowed(&self.label)))
        } else if key == self.name {
            Some(FieldValue::Number(self.value))
        } else {
            None
        }
    }

    fn field_keys(&self) -> Vec<String> {
        vec!["label".to_string(), self.name.clone()]
    }
}

/// Donut chart rendered through engine `E`.
pub struct DonutChart<E: VisEngine<f64>> {
    engine: E,
    config: DonutChartConfig,
    state: BuildState<DonutSignature>,
    container: Option<ContainerId>,
    donut: Option<DrawableId>,
    legend: Option<LegendId>,
    hover: HoverSlot<DonutSlice>,
    title_formatter: Option<TitleFormatterFn<DonutSlice>>,
    value_formatter: Option<ValueFormatterFn>,
}

impl<E: VisEngine<f64>> DonutChart<E> {
    #[must_use]
    pub fn new(engine: E, config: DonutChartConfig) -> Self {
        Self {
            engine,
            config,
            state: BuildState::Unbuilt,
            container: None,
            donut: None,
            legend: None,
            hover: HoverSlot::new(),
            title_formatter: None,
            value_formatter: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DonutChartConfig {
        &self.config
    }

    /// Replaces the inputs; the change lands on the next [`sync`](Self::sync).
    pub fn set_config(&mut self, config: DonutChartConfig) {
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
    pub fn state(&self) -> &BuildState<DonutSignature> {
        &self.state
    }

    /// The structural shape of the current inputs. The donut rebuilds on
    /// shape, tooltip, and legend visibility changes; everything else
    /// refreshes in place.
    #[must_use]
    pub fn structural_signature(&self) -> DonutSignature {
        DonutSignature {
            shape: self.config.shape,
            hide_tooltip: self.config.hide_tooltip,
            hide_legend: self.config.hide_legend,
        }
    }

    pub fn set_title_formatter(&mut self, formatter: TitleFormatterFn<DonutSlice>) {
        self.title_formatter = Some(formatter);
    }

    pub fn set_value_formatter(&mut self, formatter: ValueFormatterFn) {
        self.value_formatter = Some(formatter);
    }

    /// The segment currently hovered, if any.
    #[must_use]
    pub fn hovered(&self) -> Option<(usize, DonutSlice)> {
        self.hover.get()
    }

    /// Click payload: the hovered segment at click time.
    #[must_use]
    pub fn on_click(&self) -> Option<ChartEvent<DonutSlice>> {
        self.hover
            .get()
            .map(|(index, row)| ChartEvent { row, index })
    }

    /// Reconciles the chart against the host surfaces and current inputs,
    /// returning the action taken.
    pub fn sync(&mut self, host: &ChartHost, data: &[f64]) -> ChartResult<SyncAction> {
        let signature = self.structural_signature();
        let surface = host
            .chart_surface()
            .filter(|_| self.engine.is_interactive());
        let action = decide(surface.is_some(), &self.state, &signature);
        debug!(?action, segments = data.len(), "donut chart sync");
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

    /// Destroys every engine object this view owns and seals the view.
    pub fn release(&mut self) -> ChartResult<()> {
        if self.state.is_released() {
            return Ok(());
        }
        trace!("releasing donut chart");
        self.teardown()?;
        self.state = BuildState::Released;
        Ok(())
    }

    fn construct(&mut self, surface: Surface, data: &[f64]) -> ChartResult<()> {
        trace!(shape = ?self.config.shape, "constructing donut chart");
        let donut = self.donut_config();
        self.donut = Some(self.engine.create_drawable(DrawableConfig::Donut(donut))?);
        let container = self.container_config();
        self.container = Some(self.engine.mount_container(surface, container, data)?);
        Ok(())
    }

    fn refresh(&mut self, data: &[f64]) -> ChartResult<()> {
        if let Some(id) = self.donut {
            let config = self.donut_config();
            self.engine
                .update_drawable(id, DrawableConfig::Donut(config))?;
        }
        if let Some(id) = self.container {
            let config = self.container_config();
            self.engine.update_container(id, config)?;
            self.engine.set_data(id, data)?;
        }
        Ok(())
    }

    fn teardown(&mut self) -> ChartResult<()> {
        if let Some(id) = self.container.take() {
            self.engine.destroy_container(id)?;
        }
        if let Some(id) = self.donut.take() {
            self.engine.destroy_drawable(id)?;
        }
        if let Some(id) = self.legend.take() {
            self.engine.destroy_legend(id)?;
        }
        self.hover.clear();
        Ok(())
    }

    fn donut_config(&self) -> DonutConfig<f64> {
        DonutConfig {
            value: Arc::new(|value: &f64| *value),
            colors: extract_colors(&self.config.categories),
            arc_width: self.config.arc_width,
            corner_radius: self.config.corner_radius,
            pad_angle: self.config.pad_angle,
            angle_range: self.config.shape.angle_range(),
        }
    }

    fn container_config(&self) -> ContainerConfig<f64> {
        let mut components: SmallVec<[DrawableId; 4]> = SmallVec::new();
        components.extend(self.donut);
        let tooltip = if self.config.hide_tooltip {
            None
        } else {
            Some(
                TooltipConfig::new()
                    .with_shifts(TOOLTIP_SHIFT, TOOLTIP_SHIFT)
                    .with_trigger(Selector::DonutSegment, self.tooltip_template()),
            )
        };
        ContainerConfig {
            height: Some(self.config.height),
            padding: None,
            x_domain: None,
            y_domain: None,
            components,
            x_axis: None,
            y_axis: None,
            scale_by_domain: false,
            tooltip,
            crosshair: None,
        }
    }

    /// Segment hover hook: pairs the value with the category at the segment
    /// index, records the slice, and renders the shared tooltip markup for
    /// it.
    fn tooltip_template(&self) -> TooltipTemplateFn<f64> {
        let hover = self.hover.clone();
        let categories = self.config.categories.clone();
        let title_formatter = self.title_formatter.clone();
        let value_formatter = self.value_formatter.clone();
        Arc::new(move |value: &f64, index: usize| {
            let (_, style) = categories.get_index(index)?;
            let name = style.name.clone();
            let slice = DonutSlice {
                label: name.clone(),
                name,
                value: *value,
            };
            hover.set(index, slice.clone());
            Some(tooltip_html(
                &slice,
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

impl<E: VisEngine<f64>> Drop for DonutChart<E> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

#[cfg(test)]
mod tests {
    use crate::core::category::CategoryStyle;
    use crate::engine::{RecordingEngine, SurfaceId};

    use super::*;

    fn categories() -> CategoryMap {
        CategoryMap::new()
            .with("Desktop", CategoryStyle::named("Desktop").with_color("#2563eb"))
            .with("Mobile", CategoryStyle::named("Mobile").with_color("#60a5fa"))
            .with("Tablet", CategoryStyle::named("Tablet").with_color("#93c5fd"))
    }

    fn host() -> ChartHost {
        ChartHost::new(Surface::attached(SurfaceId::from_raw(1)))
    }

    #[test]
    fn builds_one_donut_drawable() {
        let mut chart = DonutChart::new(RecordingEngine::new(), DonutChartConfig::new(categories()));
        let action = chart.sync(&host(), &[40.0, 35.0, 25.0]).unwrap();
        assert_eq!(action, SyncAction::Construct);
        assert_eq!(chart.engine().live_drawables(), 1);
        assert_eq!(chart.engine().live_containers(), 1);
    }

    #[test]
    fn shape_change_rebuilds() {
        let mut chart = DonutChart::new(RecordingEngine::new(), DonutChartConfig::new(categories()));
        chart.sync(&host(), &[40.0, 35.0, 25.0]).unwrap();
        let config = chart.config().clone().with_shape(DonutShape::Half);
        chart.set_config(config);
        let action = chart.sync(&host(), &[40.0, 35.0, 25.0]).unwrap();
        assert_eq!(action, SyncAction::Rebuild);
        match chart.engine().drawable_config(chart.donut.unwrap()) {
            Some(DrawableConfig::Donut(donut)) => assert!(donut.angle_range.is_some()),
            _ => panic!("donut config missing"),
        }
    }

    #[test]
    fn arc_width_change_refreshes_in_place() {
        let mut chart = DonutChart::new(RecordingEngine::new(), DonutChartConfig::new(categories()));
        chart.sync(&host(), &[40.0, 35.0, 25.0]).unwrap();
        let config = chart.config().clone().with_arc_width(32.0);
        chart.set_config(config);
        let action = chart.sync(&host(), &[40.0, 35.0, 25.0]).unwrap();
        assert_eq!(action, SyncAction::Refresh);
    }

    #[test]
    fn segment_hover_pairs_value_with_its_category() {
        let mut chart = DonutChart::new(RecordingEngine::new(), DonutChartConfig::new(categories()));
        chart.sync(&host(), &[40.0, 35.0, 25.0]).unwrap();
        let container = chart.container().unwrap();
        let html = chart
            .engine()
            .trigger_tooltip(container, Selector::DonutSegment, 1)
            .unwrap()
            .unwrap();
        assert!(html.contains("Mobile"));
        let (index, slice) = chart.hovered().unwrap();
        assert_eq!(index, 1);
        assert_eq!(
            slice,
            DonutSlice {
                label: "Mobile".to_string(),
                name: "Mobile".to_string(),
                value: 35.0,
            }
        );
    }

    #[test]
    fn every_structural_input_rebuilds() {
        let flips: &[(&str, fn(&mut DonutChartConfig))] = &[
            ("shape", |c| c.shape = DonutShape::Half),
            ("hide_tooltip", |c| c.hide_tooltip = true),
            ("hide_legend", |c| c.hide_legend = true),
        ];
        for (field, flip) in flips {
            let mut chart =
                DonutChart::new(RecordingEngine::new(), DonutChartConfig::new(categories()));
            chart.sync(&host(), &[40.0, 35.0, 25.0]).unwrap();
            let mut config = chart.config().clone();
            flip(&mut config);
            chart.set_config(config);
            let action = chart.sync(&host(), &[40.0, 35.0, 25.0]).unwrap();
            assert_eq!(action, SyncAction::Rebuild, "{field} flip");
        }
    }
}
