use thiserror::Error;

use crate::engine::DrawableKind;

pub type ChartResult<T> = Result<T, ChartError>;

/// Failures surfaced by engine calls.
///
/// Readiness conditions (missing mount surface, detached surface,
/// non-interactive engine) never reach this type: chart views resolve them
/// to a skipped sync before touching the engine. Every variant here means a
/// caller bug or a corrupted instance table.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("cannot mount on detached surface {surface}")]
    SurfaceDetached { surface: u64 },

    #[error("unknown drawable id {id}")]
    UnknownDrawable { id: u64 },

    #[error("unknown container id {id}")]
    UnknownContainer { id: u64 },

    #[error("unknown legend id {id}")]
    UnknownLegend { id: u64 },

    #[error("config kind mismatch: drawable is {expected}, config is {found}")]
    ConfigMismatch {
        expected: DrawableKind,
        found: DrawableKind,
    },

    /// The engine rejected a config that can never produce a drawable,
    /// e.g. a bar config with no series accessors.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
