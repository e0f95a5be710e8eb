//! The reconciliation decision, separated from its side effects.
//!
//! Every chart view projects its inputs down to a small signature value and
//! asks [`decide`] what to do with its engine instances. The function is
//! pure; views own the apply step (construct / rebuild / refresh) and the
//! state transition that records the signature.

/// Build lifecycle of a chart view's engine instances.
///
/// `Released` is terminal: a released view skips every later sync, so
/// teardown can never run twice and no callback observes a dead view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildState<S> {
    Unbuilt,
    Built(S),
    Released,
}

impl<S> BuildState<S> {
    #[must_use]
    pub const fn is_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }

    #[must_use]
    pub const fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }

    /// The signature recorded at the last construct, if any.
    #[must_use]
    pub const fn signature(&self) -> Option<&S> {
        match self {
            Self::Built(signature) => Some(signature),
            Self::Unbuilt | Self::Released => None,
        }
    }
}

/// What a sync pass will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// First build: create drawables, then mount the container.
    Construct,
    /// Structure changed: destroy everything once, then construct.
    Rebuild,
    /// Structure unchanged: push fresh configs in place, then data.
    Refresh,
    /// Not ready or released: no engine calls, no state change.
    Skip,
}

/// Pure reconciliation decision.
///
/// `ready` folds together every host condition (attached surface,
/// interactive engine); the caller computes it before any engine call, so
/// "not ready" is a first-class skip rather than an error path.
pub fn decide<S: PartialEq>(ready: bool, state: &BuildState<S>, next: &S) -> SyncAction {
    match state {
        BuildState::Released => SyncAction::Skip,
        _ if !ready => SyncAction::Skip,
        BuildState::Unbuilt => SyncAction::Construct,
        BuildState::Built(prev) if prev == next => SyncAction::Refresh,
        BuildState::Built(_) => SyncAction::Rebuild,
    }
}
