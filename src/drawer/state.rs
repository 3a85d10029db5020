#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterState {
    Uninitialized,
    Ready,
    Rendering,
    Terminating,
    Stopped,
}

impl PresenterState {
    pub fn is_running(self) -> bool {
        !matches!(self, Self::Terminating | Self::Stopped)
    }
}

pub fn can_transition(from: PresenterState, to: PresenterState) -> bool {
    use PresenterState::*;
    matches!(
        (from, to),
        (Uninitialized, Rendering)
            | (Uninitialized, Ready)
            | (Rendering, Uninitialized)
            | (Rendering, Ready)
            | (Ready, Rendering)
            | (Uninitialized, Terminating)
            | (Ready, Terminating)
            | (Rendering, Terminating)
            | (Terminating, Stopped)
    ) || from == to
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_cycle_returns_to_ready() {
        assert!(can_transition(PresenterState::Ready, PresenterState::Rendering));
        assert!(can_transition(PresenterState::Rendering, PresenterState::Ready));
        assert!(can_transition(PresenterState::Uninitialized, PresenterState::Ready));
    }

    #[test]
    fn stopped_is_terminal() {
        for to in [
            PresenterState::Uninitialized,
            PresenterState::Ready,
            PresenterState::Rendering,
            PresenterState::Terminating,
        ] {
            assert!(!can_transition(PresenterState::Stopped, to));
        }
        assert!(!can_transition(PresenterState::Ready, PresenterState::Stopped));
        assert!(!PresenterState::Stopped.is_running());
    }
}
