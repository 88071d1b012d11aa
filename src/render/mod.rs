//! Render adapter boundary.
//!
//! The controller never draws. It hands a [`TransitionRequest`] and a
//! [`CompletionToken`] to a [`RenderAdapter`] and waits for the token to come back.
//! Everything about how a transition looks (blur radius, ripple displacement,
//! Ken-Burns zoom) lives on the adapter side of this module.
//!
//! - [`ripple`]: displacement ripple timeline with Ken-Burns zoom
//! - [`crossfade`]: direction-aware blur/scale cross-fade
//! - [`parallax`]: caption offset following the pointer
//! - [`ticker`]: a tokio frame ticker that runs either timeline

pub mod crossfade;
pub mod parallax;
pub mod ripple;
pub mod ticker;

use crate::models::Direction;
use tokio::sync::mpsc;

pub use crossfade::{CrossfadeVariants, LayerStyle};
pub use parallax::{ViewRect, parallax_offset};
pub use ripple::RippleTimeline;
pub use ticker::{FramePlan, FrameSample, TickerAdapter};

/// Identifies one started transition.
///
/// Tickets increase monotonically per controller, so a completion for an older
/// transition can be told apart from the one currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionTicket(pub u64);

impl std::fmt::Display for TransitionTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Visual strength in `0.0..=1.0`, opaque to the controller
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Intensity(f32);

impl Intensity {
    /// Clamp into range; NaN becomes zero
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

/// Everything an adapter is told about a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRequest {
    pub ticket: TransitionTicket,
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
    pub intensity: Intensity,
}

/// Sending half of the completion queue a controller listens on
pub type CompletionSender = mpsc::UnboundedSender<TransitionTicket>;

/// Receiving half of the completion queue
pub type CompletionReceiver = mpsc::UnboundedReceiver<TransitionTicket>;

/// Create a completion queue
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::unbounded_channel()
}

/// One-shot completion signal for a transition.
///
/// Consumed by [`complete`](Self::complete), so it can be reported at most once.
/// Completing only enqueues the ticket; the controller picks it up on its own
/// event queue, which makes completing from inside `begin_transition` safe.
/// Dropping the token without completing leaves recovery to the watchdog.
#[derive(Debug)]
pub struct CompletionToken {
    ticket: TransitionTicket,
    tx: CompletionSender,
}

impl CompletionToken {
    pub fn new(ticket: TransitionTicket, tx: CompletionSender) -> Self {
        Self { ticket, tx }
    }

    pub fn ticket(&self) -> TransitionTicket {
        self.ticket
    }

    /// Report that the transition's visual animation finished
    pub fn complete(self) {
        if self.tx.send(self.ticket).is_err() {
            tracing::debug!(
                "Completion for transition {} dropped: controller is gone",
                self.ticket
            );
        }
    }
}

/// Contract the engine requires from the rendering layer.
///
/// Implementations start an enter/exit animation for `request` and call
/// [`CompletionToken::complete`] once when it is done, synchronously or later.
/// The engine never starts a second transition before the previous one completed
/// or was recovered by the watchdog. `begin_transition` runs while the engine is
/// locked and must not call back into the carousel handle.
#[cfg_attr(test, mockall::automock)]
pub trait RenderAdapter: Send {
    fn begin_transition(&mut self, request: TransitionRequest, done: CompletionToken);
}

/// Adapter that completes every transition immediately.
///
/// Useful for hosts that switch slides without animation.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantAdapter;

impl RenderAdapter for InstantAdapter {
    fn begin_transition(&mut self, request: TransitionRequest, done: CompletionToken) {
        tracing::trace!(
            "Instant transition {} -> {} ({:?})",
            request.from,
            request.to,
            request.direction
        );
        done.complete();
    }
}

impl<A: RenderAdapter + ?Sized> RenderAdapter for Box<A> {
    fn begin_transition(&mut self, request: TransitionRequest, done: CompletionToken) {
        (**self).begin_transition(request, done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_clamps() {
        assert_eq!(Intensity::new(1.7).get(), 1.0);
        assert_eq!(Intensity::new(-0.2).get(), 0.0);
        assert_eq!(Intensity::new(f32::NAN).get(), 0.0);
        assert_eq!(Intensity::new(0.55).get(), 0.55);
    }

    #[test]
    fn test_token_delivers_ticket_once() {
        let (tx, mut rx) = completion_channel();
        let token = CompletionToken::new(TransitionTicket(7), tx);

        token.complete();

        assert_eq!(rx.try_recv().unwrap(), TransitionTicket(7));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_completion_wakes_waiting_receiver() {
        let (tx, mut rx) = completion_channel();
        let token = CompletionToken::new(TransitionTicket(9), tx);
        let mut recv = tokio_test::task::spawn(rx.recv());

        tokio_test::assert_pending!(recv.poll());
        token.complete();

        assert!(recv.is_woken());
        assert_eq!(
            tokio_test::assert_ready!(recv.poll()),
            Some(TransitionTicket(9))
        );
    }

    #[test]
    fn test_token_without_receiver_does_not_panic() {
        let (tx, rx) = completion_channel();
        drop(rx);
        CompletionToken::new(TransitionTicket(1), tx).complete();
    }

    #[test]
    fn test_instant_adapter_completes_synchronously() {
        let (tx, mut rx) = completion_channel();
        let mut adapter = InstantAdapter;
        let request = TransitionRequest {
            ticket: TransitionTicket(3),
            from: 0,
            to: 1,
            direction: Direction::Forward,
            intensity: Intensity::new(0.5),
        };

        adapter.begin_transition(request, CompletionToken::new(TransitionTicket(3), tx));

        assert_eq!(rx.try_recv().unwrap(), TransitionTicket(3));
    }
}
