//! Render state machine.
//!
//! ```text
//!            Begin                 Inhibit
//!   Idle ───────────► Rendering    Idle ─────────► Inhibited
//!    ▲                   │          ▲                  │
//!    └───── Finish ──────┘          └──── Release ─────┘
//! ```
//!
//! A render requested while one is running or while rendering is inhibited
//! is refused, which is what makes redisplay non-reentrant: a module that
//! triggers a redisplay from inside its own line production gets a no-op.

/// Where the pipeline stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Idle,
    Rendering,
    /// Bulk configuration in progress; renders are collapsed into nothing.
    Inhibited,
}

/// Requests driving [`RenderState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    Begin,
    Finish,
    Inhibit,
    Release,
}

impl RenderState {
    /// The single transition function.
    ///
    /// Returns `None` when the event is not accepted in this state; the
    /// caller treats that as "skip", never as an error.
    pub fn next(self, event: RenderEvent) -> Option<RenderState> {
        use RenderEvent::*;
        use RenderState::*;
        match (self, event) {
            (Idle, Begin) => Some(Rendering),
            (Rendering, Finish) => Some(Idle),
            (Idle, Inhibit) => Some(Inhibited),
            (Inhibited, Release) => Some(Idle),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_cycle() {
        let state = RenderState::default();
        let rendering = state.next(RenderEvent::Begin).unwrap();
        assert_eq!(rendering, RenderState::Rendering);
        assert_eq!(rendering.next(RenderEvent::Finish), Some(RenderState::Idle));
    }

    #[test]
    fn test_no_reentrant_render() {
        assert_eq!(RenderState::Rendering.next(RenderEvent::Begin), None);
        assert_eq!(RenderState::Rendering.next(RenderEvent::Inhibit), None);
    }

    #[test]
    fn test_inhibited_refuses_render() {
        let state = RenderState::Idle.next(RenderEvent::Inhibit).unwrap();
        assert_eq!(state.next(RenderEvent::Begin), None);
        assert_eq!(state.next(RenderEvent::Release), Some(RenderState::Idle));
    }

    #[test]
    fn test_unbalanced_events_rejected() {
        assert_eq!(RenderState::Idle.next(RenderEvent::Finish), None);
        assert_eq!(RenderState::Idle.next(RenderEvent::Release), None);
        assert_eq!(RenderState::Inhibited.next(RenderEvent::Inhibit), None);
    }
}
