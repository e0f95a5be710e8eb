//! Engine-exported CSS selectors keying tooltip triggers.

/// Selector constants for the hoverable parts of each drawable kind.
///
/// Tooltip triggers are registered per selector; the engine routes pointer
/// events over a matching element to the registered template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    Area,
    Line,
    GroupedBar,
    StackedBar,
    DonutSegment,
    ScatterPoint,
    TimelineLabel,
}

impl Selector {
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Area => ".vis-area",
            Self::Line => ".vis-line",
            Self::GroupedBar => ".vis-grouped-bar",
            Self::StackedBar => ".vis-stacked-bar",
            Self::DonutSegment => ".vis-donut-segment",
            Self::ScatterPoint => ".vis-scatter-point",
            Self::TimelineLabel => ".vis-timeline-label",
        }
    }
}
