//! vizkit: headless chart views over pluggable visualization engines.
//!
//! Each view (line, area, bar, donut, bubble, gantt) owns the drawables of
//! one chart and reconciles them against its inputs through a structural
//! signature: cosmetic changes refresh drawables in place, structural ones
//! tear the chart down and rebuild it. Rendering itself is delegated to a
//! [`VisEngine`](engine::VisEngine) backend; the in-crate
//! [`RecordingEngine`](engine::RecordingEngine) journals every call for
//! tests and headless use.
//!
//! Module map:
//! - [`api`] — the chart views, sync state machine, and tooltip assembly
//! - [`core`] — data access, categories, colors, formatters, legend items
//! - [`engine`] — the backend contract, config types, and recording backend
//! - [`extensions`] — gradient and marker SVG add-ons layered over a backend
//! - [`error`] — the error type shared by every engine call

pub mod api;
pub mod core;
pub mod engine;
pub mod error;
pub mod extensions;
pub mod telemetry;

pub use api::{
    AreaChart, AreaChartConfig, BarChart, BarChartConfig, BubbleChart, BubbleChartConfig,
    ChartEvent, ChartHost, DonutChart, DonutChartConfig, GanttChart, GanttChartConfig, LineChart,
    LineChartConfig, SyncAction,
};
pub use engine::{RecordingEngine, Surface, SurfaceId, VisEngine};
pub use error::{ChartError, ChartResult};
