//! Chart views.
//!
//! Each chart kind is a typed component owning a set of engine drawables and
//! keeping them in sync with host inputs through the structural-signature
//! protocol in [`sync`]. Views are generic over the engine, so the same
//! component drives a DOM adapter in production and the in-crate
//! [`RecordingEngine`](crate::engine::RecordingEngine) in tests.

pub mod area;
pub mod bar;
pub mod bubble;
pub mod donut;
pub mod gantt;
pub mod line;
pub mod signature;
pub mod sync;
pub mod tooltip;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use area::{AreaChart, AreaChartConfig};
pub use bar::{BarChart, BarChartConfig, ValueLabels};
pub use bubble::{BubbleChart, BubbleChartConfig};
pub use donut::{DonutChart, DonutChartConfig, DonutSlice};
pub use gantt::{GanttChart, GanttChartConfig, LabelHoverFn};
pub use line::{LineChart, LineChartConfig};
pub use signature::{AreaSignature, BarSignature, DonutSignature, GanttSignature, LineSignature};
pub use sync::{BuildState, SyncAction, decide};
pub use tooltip::{TitleFormatterFn, TooltipEntry, tooltip_html, tooltip_title, visible_entries};

use crate::engine::config::LegendConfig;
use crate::engine::{LegendId, Surface, VisEngine};
use crate::error::ChartResult;

/// The host's mount points: a chart surface plus an optional legend surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartHost {
    pub chart: Option<Surface>,
    pub legend: Option<Surface>,
}

impl ChartHost {
    #[must_use]
    pub const fn new(chart: Surface) -> Self {
        Self {
            chart: Some(chart),
            legend: None,
        }
    }

    /// A host with no surfaces at all; every sync against it skips.
    #[must_use]
    pub const fn headless() -> Self {
        Self {
            chart: None,
            legend: None,
        }
    }

    #[must_use]
    pub const fn with_legend(mut self, legend: Surface) -> Self {
        self.legend = Some(legend);
        self
    }

    /// The chart surface, only if present and attached.
    #[must_use]
    pub fn chart_surface(&self) -> Option<Surface> {
        self.chart.filter(|surface| surface.is_attached())
    }

    /// The legend surface, only if present and attached.
    #[must_use]
    pub fn legend_surface(&self) -> Option<Surface> {
        self.legend.filter(|surface| surface.is_attached())
    }
}

/// A hovered row reported back from `on_click`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartEvent<T> {
    pub row: T,
    pub index: usize,
}

/// Shared slot the tooltip templates write the hovered row into.
///
/// Cloned into trigger closures, read by `hovered()` / `on_click()`. Locking
/// shrugs off poisoning: a panicking template must not wedge hover state.
pub struct HoverSlot<T> {
    inner: Arc<Mutex<Option<(usize, T)>>>,
}

impl<T> HoverSlot<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set(&self, index: usize, row: T) {
        *self.lock() = Some((index, row));
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    #[must_use]
    pub fn get(&self) -> Option<(usize, T)>
    where
        T: Clone,
    {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<(usize, T)>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for HoverSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for HoverSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The legend pass shared by every chart view.
///
/// Runs on every sync, independent of the chart's build state. A hidden
/// legend tears down whatever was mounted; no attached surface means nothing
/// to do; otherwise the legend mounts once and updates in place.
pub(crate) fn sync_legend<T, E: VisEngine<T>>(
    engine: &mut E,
    surface: Option<Surface>,
    hidden: bool,
    legend: &mut Option<LegendId>,
    config: LegendConfig,
) -> ChartResult<()> {
    if hidden {
        if let Some(id) = legend.take() {
            engine.destroy_legend(id)?;
        }
        return Ok(());
    }
    let Some(surface) = surface.filter(|surface| surface.is_attached()) else {
        return Ok(());
    };
    if let Some(id) = *legend {
        engine.update_legend(id, config)?;
    } else {
        *legend = Some(engine.mount_legend(surface, config)?);
    }
    Ok(())
}
