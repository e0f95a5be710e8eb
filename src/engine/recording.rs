//! Reference backend used by tests and headless hosts.
//!
//! Keeps live instance tables, validates every call against them, and appends
//! a journal of [`EngineOp`]s that reconciliation tests assert against. Hover
//! is simulated: [`RecordingEngine::trigger_tooltip`] invokes a registered
//! trigger template exactly as a DOM engine would on pointer-over.

use std::collections::HashMap;

use tracing::trace;

use crate::engine::config::{ContainerConfig, DrawableConfig, LegendConfig};
use crate::engine::selectors::Selector;
use crate::engine::{ContainerId, DrawableId, DrawableKind, LegendId, Surface, VisEngine};
use crate::error::{ChartError, ChartResult};

/// One recorded engine call, scalar payloads only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOp {
    CreateDrawable { kind: DrawableKind },
    UpdateDrawable { kind: DrawableKind },
    DestroyDrawable { kind: DrawableKind },
    MountContainer,
    UpdateContainer,
    SetData { rows: usize },
    DestroyContainer,
    MountLegend { items: Vec<String> },
    UpdateLegend { items: Vec<String> },
    DestroyLegend,
}

struct ContainerState<T> {
    config: ContainerConfig<T>,
    data: Vec<T>,
}

/// In-memory engine that records instead of rendering.
pub struct RecordingEngine<T> {
    interactive: bool,
    next_id: u64,
    ops: Vec<EngineOp>,
    drawables: HashMap<DrawableId, DrawableConfig<T>>,
    containers: HashMap<ContainerId, ContainerState<T>>,
    legends: HashMap<LegendId, LegendConfig>,
}

impl<T> RecordingEngine<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interactive: true,
            next_id: 0,
            ops: Vec::new(),
            drawables: HashMap::new(),
            containers: HashMap::new(),
            legends: HashMap::new(),
        }
    }

    /// Engine reporting a non-interactive environment; views must skip.
    #[must_use]
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            ..Self::new()
        }
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// The journal so far, oldest first.
    #[must_use]
    pub fn ops(&self) -> &[EngineOp] {
        &self.ops
    }

    /// Drains the journal so a test can assert one phase in isolation.
    pub fn take_ops(&mut self) -> Vec<EngineOp> {
        std::mem::take(&mut self.ops)
    }

    #[must_use]
    pub fn live_drawables(&self) -> usize {
        self.drawables.len()
    }

    #[must_use]
    pub fn live_containers(&self) -> usize {
        self.containers.len()
    }

    #[must_use]
    pub fn live_legends(&self) -> usize {
        self.legends.len()
    }

    #[must_use]
    pub fn drawable_config(&self, id: DrawableId) -> Option<&DrawableConfig<T>> {
        self.drawables.get(&id)
    }

    #[must_use]
    pub fn container_config(&self, id: ContainerId) -> Option<&ContainerConfig<T>> {
        self.containers.get(&id).map(|state| &state.config)
    }

    #[must_use]
    pub fn container_data(&self, id: ContainerId) -> Option<&[T]> {
        self.containers.get(&id).map(|state| state.data.as_slice())
    }

    #[must_use]
    pub fn legend_config(&self, id: LegendId) -> Option<&LegendConfig> {
        self.legends.get(&id)
    }

    /// Simulates pointer-over on an element matched by `selector`, invoking
    /// the first registered trigger for it with the row at `index`.
    ///
    /// Returns the template's markup, or `None` when the container has no
    /// matching trigger or the index is out of range.
    pub fn trigger_tooltip(
        &self,
        id: ContainerId,
        selector: Selector,
        index: usize,
    ) -> ChartResult<Option<String>> {
        let state = self
            .containers
            .get(&id)
            .ok_or(ChartError::UnknownContainer { id: id.raw() })?;
        let Some(tooltip) = &state.config.tooltip else {
            return Ok(None);
        };
        let Some((_, template)) = tooltip.triggers.iter().find(|(s, _)| *s == selector) else {
            return Ok(None);
        };
        Ok(state.data.get(index).and_then(|row| template(row, index)))
    }

    /// Simulates the crosshair passing over the row at `index`.
    pub fn trigger_crosshair(&self, id: ContainerId, index: usize) -> ChartResult<Option<String>> {
        let state = self
            .containers
            .get(&id)
            .ok_or(ChartError::UnknownContainer { id: id.raw() })?;
        let Some(crosshair) = &state.config.crosshair else {
            return Ok(None);
        };
        Ok(state
            .data
            .get(index)
            .and_then(|row| (crosshair.template)(row, index)))
    }

    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_components(&self, config: &ContainerConfig<T>) -> ChartResult<()> {
        let referenced = config
            .components
            .iter()
            .copied()
            .chain(config.x_axis)
            .chain(config.y_axis);
        for id in referenced {
            if !self.drawables.contains_key(&id) {
                return Err(ChartError::UnknownDrawable { id: id.raw() });
            }
        }
        Ok(())
    }
}

impl<T> Default for RecordingEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> VisEngine<T> for RecordingEngine<T> {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn create_drawable(&mut self, config: DrawableConfig<T>) -> ChartResult<DrawableId> {
        check_drawable(&config)?;
        let id = DrawableId::from_raw(self.fresh_id());
        let kind = config.kind();
        trace!(kind = %kind, id = id.raw(), "create drawable");
        self.ops.push(EngineOp::CreateDrawable { kind });
        self.drawables.insert(id, config);
        Ok(id)
    }

    fn update_drawable(&mut self, id: DrawableId, config: DrawableConfig<T>) -> ChartResult<()> {
        let current = self
            .drawables
            .get_mut(&id)
            .ok_or(ChartError::UnknownDrawable { id: id.raw() })?;
        if current.kind() != config.kind() {
            return Err(ChartError::ConfigMismatch {
                expected: current.kind(),
                found: config.kind(),
            });
        }
        check_drawable(&config)?;
        self.ops.push(EngineOp::UpdateDrawable {
            kind: config.kind(),
        });
        *current = config;
        Ok(())
    }

    fn destroy_drawable(&mut self, id: DrawableId) -> ChartResult<()> {
        let config = self
            .drawables
            .remove(&id)
            .ok_or(ChartError::UnknownDrawable { id: id.raw() })?;
        trace!(kind = %config.kind(), id = id.raw(), "destroy drawable");
        self.ops.push(EngineOp::DestroyDrawable {
            kind: config.kind(),
        });
        Ok(())
    }

    fn mount_container(
        &mut self,
        surface: Surface,
        config: ContainerConfig<T>,
        data: &[T],
    ) -> ChartResult<ContainerId> {
        if !surface.is_attached() {
            return Err(ChartError::SurfaceDetached {
                surface: surface.id().raw(),
            });
        }
        self.check_components(&config)?;
        let id = ContainerId::from_raw(self.fresh_id());
        trace!(id = id.raw(), rows = data.len(), "mount container");
        self.ops.push(EngineOp::MountContainer);
        self.containers.insert(
            id,
            ContainerState {
                config,
                data: data.to_vec(),
            },
        );
        Ok(id)
    }

    fn update_container(&mut self, id: ContainerId, config: ContainerConfig<T>) -> ChartResult<()> {
        if !self.containers.contains_key(&id) {
            return Err(ChartError::UnknownContainer { id: id.raw() });
        }
        self.check_components(&config)?;
        self.ops.push(EngineOp::UpdateContainer);
        if let Some(state) = self.containers.get_mut(&id) {
            state.config = config;
        }
        Ok(())
    }

    fn set_data(&mut self, id: ContainerId, data: &[T]) -> ChartResult<()> {
        let state = self
            .containers
            .get_mut(&id)
            .ok_or(ChartError::UnknownContainer { id: id.raw() })?;
        self.ops.push(EngineOp::SetData { rows: data.len() });
        state.data = data.to_vec();
        Ok(())
    }

    fn destroy_container(&mut self, id: ContainerId) -> ChartResult<()> {
        self.containers
            .remove(&id)
            .ok_or(ChartError::UnknownContainer { id: id.raw() })?;
        trace!(id = id.raw(), "destroy container");
        self.ops.push(EngineOp::DestroyContainer);
        Ok(())
    }

    fn mount_legend(&mut self, surface: Surface, config: LegendConfig) -> ChartResult<LegendId> {
        if !surface.is_attached() {
            return Err(ChartError::SurfaceDetached {
                surface: surface.id().raw(),
            });
        }
        let id = LegendId::from_raw(self.fresh_id());
        self.ops.push(EngineOp::MountLegend {
            items: item_names(&config),
        });
        self.legends.insert(id, config);
        Ok(id)
    }

    fn update_legend(&mut self, id: LegendId, config: LegendConfig) -> ChartResult<()> {
        if !self.legends.contains_key(&id) {
            return Err(ChartError::UnknownLegend { id: id.raw() });
        }
        self.ops.push(EngineOp::UpdateLegend {
            items: item_names(&config),
        });
        self.legends.insert(id, config);
        Ok(())
    }

    fn destroy_legend(&mut self, id: LegendId) -> ChartResult<()> {
        self.legends
            .remove(&id)
            .ok_or(ChartError::UnknownLegend { id: id.raw() })?;
        self.ops.push(EngineOp::DestroyLegend);
        Ok(())
    }
}

fn item_names(config: &LegendConfig) -> Vec<String> {
    config.items.iter().map(|item| item.name.clone()).collect()
}

/// Bar primitives draw one bar per series accessor; an empty set can never
/// produce a drawable.
fn check_drawable<T>(config: &DrawableConfig<T>) -> ChartResult<()> {
    match config {
        DrawableConfig::GroupedBar(bars) | DrawableConfig::StackedBar(bars)
            if bars.y.is_empty() =>
        {
            Err(ChartError::InvalidConfig(
                "bar drawable needs at least one series accessor".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::engine::config::{AxisConfig, AxisKind, BarConfig, Orientation, TooltipConfig};
    use crate::engine::SurfaceId;

    use super::*;

    fn axis() -> DrawableConfig<u32> {
        DrawableConfig::Axis(AxisConfig::new(AxisKind::X))
    }

    #[test]
    fn updating_with_a_different_kind_is_a_mismatch() {
        let mut engine = RecordingEngine::new();
        let id = engine.create_drawable(axis()).unwrap();
        let err = engine
            .update_drawable(
                id,
                DrawableConfig::Labels(crate::engine::config::LabelsConfig {
                    x: Arc::new(|_, i| i as f64),
                    y: Arc::new(|_, _| 0.0),
                    text: Arc::new(|_| String::new()),
                    color: None,
                }),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ChartError::ConfigMismatch {
                expected: DrawableKind::Axis,
                found: DrawableKind::Labels,
            }
        ));
    }

    #[test]
    fn bar_config_without_series_accessors_is_rejected() {
        let mut engine = RecordingEngine::<u32>::new();
        let config = DrawableConfig::GroupedBar(BarConfig {
            x: Arc::new(|_, i| i as f64),
            y: Vec::new(),
            colors: Vec::new(),
            orientation: Orientation::default(),
            group_padding: 0.0,
            bar_padding: 0.2,
            rounded_corners: 0.0,
        });
        let err = engine.create_drawable(config).unwrap_err();
        assert!(matches!(err, ChartError::InvalidConfig(_)));
        assert!(engine.ops().is_empty());
        assert_eq!(engine.live_drawables(), 0);
    }

    #[test]
    fn destroyed_drawables_are_unknown_afterwards() {
        let mut engine = RecordingEngine::<u32>::new();
        let id = engine.create_drawable(axis()).unwrap();
        engine.destroy_drawable(id).unwrap();
        assert!(matches!(
            engine.destroy_drawable(id),
            Err(ChartError::UnknownDrawable { .. })
        ));
    }

    #[test]
    fn mounting_on_a_detached_surface_is_an_error() {
        let mut engine = RecordingEngine::<u32>::new();
        let surface = Surface::detached(SurfaceId::from_raw(3));
        let err = engine
            .mount_container(surface, ContainerConfig::new(), &[])
            .unwrap_err();
        assert!(matches!(err, ChartError::SurfaceDetached { surface: 3 }));
    }

    #[test]
    fn container_config_referencing_unknown_drawable_is_rejected() {
        let mut engine = RecordingEngine::<u32>::new();
        let surface = Surface::attached(SurfaceId::from_raw(1));
        let config = ContainerConfig::new().with_component(DrawableId::from_raw(99));
        assert!(matches!(
            engine.mount_container(surface, config, &[]),
            Err(ChartError::UnknownDrawable { id: 99 })
        ));
    }

    #[test]
    fn set_data_journals_the_row_count() {
        let mut engine = RecordingEngine::new();
        let surface = Surface::attached(SurfaceId::from_raw(1));
        let id = engine
            .mount_container(surface, ContainerConfig::new(), &[1u32, 2])
            .unwrap();
        engine.set_data(id, &[1, 2, 3]).unwrap();
        assert_eq!(engine.ops().last(), Some(&EngineOp::SetData { rows: 3 }));
        assert_eq!(engine.container_data(id), Some([1u32, 2, 3].as_slice()));
    }

    #[test]
    fn trigger_tooltip_invokes_the_matching_template() {
        let mut engine = RecordingEngine::new();
        let surface = Surface::attached(SurfaceId::from_raw(1));
        let tooltip = TooltipConfig::new().with_trigger(
            Selector::Area,
            Arc::new(|row: &u32, index| Some(format!("row {row} at {index}"))),
        );
        let config = ContainerConfig {
            tooltip: Some(tooltip),
            ..ContainerConfig::new()
        };
        let id = engine.mount_container(surface, config, &[7u32, 8]).unwrap();
        let html = engine.trigger_tooltip(id, Selector::Area, 1).unwrap();
        assert_eq!(html.as_deref(), Some("row 8 at 1"));
        assert!(engine
            .trigger_tooltip(id, Selector::Line, 1)
            .unwrap()
            .is_none());
        assert!(engine
            .trigger_tooltip(id, Selector::Area, 9)
            .unwrap()
            .is_none());
    }
}
