//! Per-session overlay bookkeeping.

use crate::anchor::AnchorRect;
use crate::landmark::LandmarkSet;

/// The mutable state of one overlay session.
///
/// Created on activation, torn down on stop. This is the only
/// session-scoped shared state in the engine; the render loop reads it,
/// UI-driven calls (garment switch, stop) write it.
#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    /// Whether the session is between `start()` and `stop()`.
    pub active: bool,

    /// Identity of the currently selected garment, if any.
    pub current_garment_key: Option<String>,

    /// The landmark set from the most recent successful detection.
    pub last_landmarks: Option<LandmarkSet>,

    /// The anchor rect from the most recent successful anchor computation.
    pub last_anchor: Option<AnchorRect>,
}

impl OverlayState {
    /// Clear everything back to the inactive state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_session_data() {
        let mut state = OverlayState {
            active: true,
            current_garment_key: Some("shirt".into()),
            last_landmarks: Some(LandmarkSet::default()),
            last_anchor: Some(AnchorRect::new(0.0, 0.0, 1.0, 1.0)),
        };
        state.reset();
        assert!(!state.active);
        assert!(state.current_garment_key.is_none());
        assert!(state.last_landmarks.is_none());
        assert!(state.last_anchor.is_none());
    }
}
