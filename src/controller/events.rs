use crate::models::Direction;
use crate::render::TransitionTicket;

/// Events emitted when the carousel changes
///
/// Returned from every controller operation and broadcast to subscribers of a
/// [`Carousel`](crate::carousel::Carousel). Hosts re-render indicators off
/// [`IndexChanged`](CarouselEvent::IndexChanged), never off completion.
#[derive(Clone, Debug, PartialEq)]
pub enum CarouselEvent {
    /// The current index was committed to a new value
    IndexChanged {
        index: usize,
        previous: usize,
        direction: Direction,
    },

    /// The render adapter was asked to animate a transition
    TransitionStarted {
        ticket: TransitionTicket,
        from: usize,
        to: usize,
        direction: Direction,
    },

    /// The adapter reported the transition finished
    TransitionCompleted {
        ticket: TransitionTicket,
        index: usize,
    },

    /// A request arrived while busy and now occupies the pending slot
    RequestCoalesced {
        pending: usize,
        replaced: Option<usize>,
    },

    /// No completion arrived in time; the busy window was forced closed
    WatchdogFired {
        ticket: TransitionTicket,
        pending: Option<usize>,
    },

    /// Autoplay stopped firing (hover, hidden page, or explicit pause)
    AutoplayPaused,

    /// Autoplay started again; its period restarts from zero
    AutoplayResumed,
}

impl CarouselEvent {
    /// New index if this event commits an index change
    pub fn committed_index(&self) -> Option<usize> {
        match self {
            CarouselEvent::IndexChanged { index, .. } => Some(*index),
            _ => None,
        }
    }
}
