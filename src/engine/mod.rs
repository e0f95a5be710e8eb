//! Contract to the wrapped visualization engine.
//!
//! Chart views never draw. They construct engine drawables, push full configs
//! into them, and feed data to a container, all through [`VisEngine`]. The
//! in-crate [`RecordingEngine`] is the reference backend used by tests.

pub mod config;
pub mod recording;
pub mod selectors;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use config::{
    AreaConfig, AxisConfig, AxisKind, BarConfig, ContainerConfig, CrosshairConfig, CurveKind,
    DonutConfig, DonutShape, DrawableConfig, LabelsConfig, LegendConfig, LineConfig, Orientation,
    Padding, Position, ScatterConfig, TimelineConfig, TooltipConfig, TooltipTemplateFn,
};
pub use recording::{EngineOp, RecordingEngine};
pub use selectors::Selector;

use crate::error::ChartResult;

/// Handle to one engine drawable instance (a series, an axis, a label set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableId(u64);

impl DrawableId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to one mounted container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

impl ContainerId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to one mounted legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegendId(u64);

impl LegendId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Identity of a host-provided mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl SurfaceId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A host mount point for a container or legend.
///
/// A surface can exist without being attached to the live document; mounting
/// is only legal on an attached surface, and chart views treat a detached one
/// as a skip condition rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    id: SurfaceId,
    attached: bool,
}

impl Surface {
    #[must_use]
    pub const fn attached(id: SurfaceId) -> Self {
        Self { id, attached: true }
    }

    #[must_use]
    pub const fn detached(id: SurfaceId) -> Self {
        Self { id, attached: false }
    }

    #[must_use]
    pub const fn id(self) -> SurfaceId {
        self.id
    }

    #[must_use]
    pub const fn is_attached(self) -> bool {
        self.attached
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }
}

/// The drawable taxonomy; every [`DrawableConfig`] variant maps to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawableKind {
    Area,
    Line,
    GroupedBar,
    StackedBar,
    Donut,
    Scatter,
    Timeline,
    Labels,
    Axis,
}

impl fmt::Display for DrawableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Area => "area",
            Self::Line => "line",
            Self::GroupedBar => "grouped-bar",
            Self::StackedBar => "stacked-bar",
            Self::Donut => "donut",
            Self::Scatter => "scatter",
            Self::Timeline => "timeline",
            Self::Labels => "labels",
            Self::Axis => "axis",
        };
        f.write_str(name)
    }
}

/// Contract implemented by any wrapped engine backend.
///
/// The surface is deliberately narrow: construct a drawable from a full
/// config, reconfigure it with an equally full config, hand data to a
/// container, destroy. Backends own all rendering, scales, and layout.
///
/// Readiness is the caller's concern. Views check surfaces and
/// [`is_interactive`](Self::is_interactive) before calling in, so an error
/// from these methods indicates a reconciliation bug, not a host condition.
pub trait VisEngine<T> {
    /// False models a non-interactive environment (e.g. server-side
    /// rendering) in which no drawable may be constructed.
    fn is_interactive(&self) -> bool {
        true
    }

    fn create_drawable(&mut self, config: DrawableConfig<T>) -> ChartResult<DrawableId>;

    /// Pushes a full replacement config into a live drawable. The config's
    /// variant must match the kind the drawable was created with.
    fn update_drawable(&mut self, id: DrawableId, config: DrawableConfig<T>) -> ChartResult<()>;

    fn destroy_drawable(&mut self, id: DrawableId) -> ChartResult<()>;

    /// Mounts a container on an attached surface with its initial data.
    fn mount_container(
        &mut self,
        surface: Surface,
        config: ContainerConfig<T>,
        data: &[T],
    ) -> ChartResult<ContainerId>;

    fn update_container(&mut self, id: ContainerId, config: ContainerConfig<T>) -> ChartResult<()>;

    /// Replaces the container's data without touching its config.
    fn set_data(&mut self, id: ContainerId, data: &[T]) -> ChartResult<()>;

    fn destroy_container(&mut self, id: ContainerId) -> ChartResult<()>;

    fn mount_legend(&mut self, surface: Surface, config: LegendConfig) -> ChartResult<LegendId>;

    fn update_legend(&mut self, id: LegendId, config: LegendConfig) -> ChartResult<()>;

    fn destroy_legend(&mut self, id: LegendId) -> ChartResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surfaces_toggle_attachment() {
        let mut surface = Surface::detached(SurfaceId::from_raw(1));
        assert!(!surface.is_attached());
        surface.attach();
        assert!(surface.is_attached());
        assert_eq!(surface.id(), SurfaceId::from_raw(1));
    }

    #[test]
    fn drawable_kind_displays_kebab_case() {
        assert_eq!(DrawableKind::GroupedBar.to_string(), "grouped-bar");
        assert_eq!(DrawableKind::Axis.to_string(), "axis");
    }

    #[test]
    fn ids_round_trip_raw_values() {
        assert_eq!(DrawableId::from_raw(7).raw(), 7);
        assert_eq!(ContainerId::from_raw(9).raw(), 9);
    }
}
