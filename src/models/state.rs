use serde::{Deserialize, Serialize};

/// Sign of a transition, consumed by render adapters to shape enter/exit geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// +1 for forward, -1 for backward
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// Direction of the shorter way round from `from` to `to` on a ring of `count` slides.
    ///
    /// Ties (exactly opposite on an even ring) resolve forward.
    pub fn cyclic(from: usize, to: usize, count: usize) -> Self {
        if count == 0 {
            return Direction::Forward;
        }
        let forward = (to + count - from % count) % count;
        let backward = count - forward;
        if forward <= backward {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

/// A jump deferred while a transition was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingJump {
    pub index: usize,
    /// Direction intent of a next/prev request; `None` for plain jumps
    pub intent: Option<Direction>,
}

/// Mutable state of one carousel.
///
/// Only [`TransitionController`](crate::controller::TransitionController) mutates this;
/// everything else reads a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub current_index: usize,
    pub direction: Direction,
    pub busy: bool,
    pub pending: Option<PendingJump>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            current_index: 0,
            direction: Direction::Forward,
            busy: false,
            pending: None,
        }
    }
}

impl ControllerState {
    /// Index queued behind the in-flight transition, if any
    pub fn pending_index(&self) -> Option<usize> {
        self.pending.map(|p| p.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_direction_neighbours() {
        assert_eq!(Direction::cyclic(0, 1, 3), Direction::Forward);
        assert_eq!(Direction::cyclic(0, 2, 3), Direction::Backward);
        assert_eq!(Direction::cyclic(2, 0, 3), Direction::Forward);
        assert_eq!(Direction::cyclic(1, 0, 3), Direction::Backward);
    }

    #[test]
    fn test_cyclic_direction_tie_is_forward() {
        assert_eq!(Direction::cyclic(0, 2, 4), Direction::Forward);
        assert_eq!(Direction::cyclic(0, 1, 2), Direction::Forward);
    }

    #[test]
    fn test_cyclic_direction_far_jump() {
        // 5 slides: 1 -> 4 is three steps forward but two back
        assert_eq!(Direction::cyclic(1, 4, 5), Direction::Backward);
        assert_eq!(Direction::cyclic(1, 3, 5), Direction::Forward);
    }

    #[test]
    fn test_default_state() {
        let state = ControllerState::default();
        assert_eq!(state.current_index, 0);
        assert!(!state.busy);
        assert_eq!(state.pending_index(), None);
    }

    #[test]
    fn test_sign() {
        assert_eq!(Direction::Forward.sign(), 1);
        assert_eq!(Direction::Backward.sign(), -1);
    }
}
