// Transition controller
//
// The single authority over which slide is current. Every request (autoplay,
// gesture, keyboard, host API) comes through here and is either started,
// coalesced into the pending slot, or ignored. The render adapter is driven from
// here and unblocks the controller by completing its token.

mod events;

pub use events::CarouselEvent;

use crate::metrics::Metrics;
use crate::models::{ControllerState, Direction, PendingJump, Slide};
use crate::render::{
    CompletionSender, CompletionToken, Intensity, RenderAdapter, TransitionRequest,
    TransitionTicket,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Default time to wait for a completion signal before forcing the busy window closed
pub const DEFAULT_WATCHDOG: Duration = Duration::from_millis(1500);

/// The transition currently owned by the render adapter
#[derive(Debug, Clone, Copy)]
struct InFlight {
    ticket: TransitionTicket,
    started_at: Instant,
}

/// State machine owning the current index, direction, busy flag and pending jump.
///
/// # Busy window
///
/// A started transition sets `busy` until the adapter completes the matching
/// [`TransitionTicket`] or the watchdog fires. Requests arriving in between are
/// not started; the latest one is kept in a single pending slot and replayed as
/// soon as the window closes. Intermediate requests are dropped on purpose.
///
/// # Events
///
/// Every operation returns the [`CarouselEvent`]s it produced, in order. Callers
/// forward them to listeners; the controller itself never calls out except into
/// the render adapter.
///
/// # Related Types
///
/// - [`crate::carousel::Carousel`]: shared handle that serializes access
/// - [`crate::render::RenderAdapter`]: receives `begin_transition`
pub struct TransitionController {
    slides: Arc<[Slide]>,
    state: ControllerState,
    intensity: Intensity,
    watchdog: Duration,
    adapter: Box<dyn RenderAdapter>,
    completions: CompletionSender,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionController")
            .field("slides", &self.slides.len())
            .field("state", &self.state)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl TransitionController {
    /// Create a controller at index 0, idle, with nothing pending
    ///
    /// # Arguments
    /// * `slides` - Fixed slide sequence; may be empty, navigation is then a no-op
    /// * `adapter` - Render adapter driven for every started transition
    /// * `completions` - Queue completion tokens report into; the owner feeds
    ///   received tickets back through [`on_transition_complete`](Self::on_transition_complete)
    pub fn new(
        slides: impl Into<Arc<[Slide]>>,
        adapter: Box<dyn RenderAdapter>,
        completions: CompletionSender,
    ) -> Self {
        Self {
            slides: slides.into(),
            state: ControllerState::default(),
            intensity: Intensity::new(0.55),
            watchdog: DEFAULT_WATCHDOG,
            adapter,
            completions,
            in_flight: None,
            next_ticket: 1,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = Intensity::new(intensity);
        self
    }

    pub fn with_watchdog(mut self, watchdog: Duration) -> Self {
        self.watchdog = watchdog;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn index(&self) -> usize {
        self.state.current_index
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.state.current_index)
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Ticket of the transition the adapter is currently running
    pub fn in_flight(&self) -> Option<TransitionTicket> {
        self.in_flight.map(|f| f.ticket)
    }

    /// Advance one slide, wrapping past the end
    pub fn request_next(&mut self) -> Vec<CarouselEvent> {
        let target = self.offset_index(1);
        self.request(target, Some(Direction::Forward))
    }

    /// Go back one slide, wrapping past the start
    pub fn request_prev(&mut self) -> Vec<CarouselEvent> {
        let target = self.offset_index(-1);
        self.request(target, Some(Direction::Backward))
    }

    /// Go to slide `index`.
    ///
    /// Same index and out-of-range indices are ignored without error. While a
    /// transition is in flight the request replaces whatever is pending.
    pub fn request_jump(&mut self, index: usize) -> Vec<CarouselEvent> {
        self.request(index, None)
    }

    /// Close the busy window of `ticket` and replay the pending jump, if any.
    ///
    /// Tickets that are not in flight (already recovered by the watchdog, or
    /// unknown) are ignored.
    pub fn on_transition_complete(&mut self, ticket: TransitionTicket) -> Vec<CarouselEvent> {
        let Some(in_flight) = self.in_flight.filter(|f| f.ticket == ticket) else {
            tracing::debug!(
                "Ignoring completion for transition {} (in flight: {:?})",
                ticket,
                self.in_flight.map(|f| f.ticket)
            );
            self.metrics.record_stale_completion();
            return Vec::new();
        };

        self.in_flight = None;
        self.state.busy = false;
        self.metrics
            .record_transition_completed(in_flight.started_at.elapsed());
        tracing::debug!(
            "Transition {} complete, index {}",
            ticket,
            self.state.current_index
        );

        let mut events = vec![CarouselEvent::TransitionCompleted {
            ticket,
            index: self.state.current_index,
        }];
        events.extend(self.drain_pending());
        events
    }

    /// Instant at which the watchdog fires for the in-flight transition
    pub fn watchdog_deadline(&self) -> Option<Instant> {
        self.in_flight.map(|f| f.started_at + self.watchdog)
    }

    /// Force the busy window closed if its transition has outlived the watchdog
    pub fn poll_watchdog(&mut self, now: Instant) -> Vec<CarouselEvent> {
        match self.watchdog_deadline() {
            Some(deadline) if now >= deadline => self.force_unblock(),
            _ => Vec::new(),
        }
    }

    /// Close the busy window without a completion signal and drain the pending jump
    pub fn force_unblock(&mut self) -> Vec<CarouselEvent> {
        let Some(in_flight) = self.in_flight.take() else {
            return Vec::new();
        };

        self.state.busy = false;
        let pending = self.state.pending_index();
        self.metrics
            .record_watchdog_recovery(in_flight.started_at.elapsed());
        tracing::warn!(
            "No completion for transition {} within {:?}, unblocking (pending: {:?})",
            in_flight.ticket,
            self.watchdog,
            pending
        );

        let mut events = vec![CarouselEvent::WatchdogFired {
            ticket: in_flight.ticket,
            pending,
        }];
        events.extend(self.drain_pending());
        events
    }

    /// Drop anything pending and forget the in-flight transition.
    ///
    /// Used on teardown; a completion arriving afterwards is treated as stale.
    pub fn reset_busy(&mut self) {
        self.in_flight = None;
        self.state.busy = false;
        self.state.pending = None;
    }

    fn offset_index(&self, step: isize) -> usize {
        let count = self.slides.len();
        if count == 0 {
            return 0;
        }
        let current = self.state.current_index as isize;
        (current + step).rem_euclid(count as isize) as usize
    }

    fn request(&mut self, index: usize, intent: Option<Direction>) -> Vec<CarouselEvent> {
        let count = self.slides.len();
        if index >= count {
            tracing::debug!("Ignoring jump to {} ({} slides)", index, count);
            self.metrics.record_ignored();
            return Vec::new();
        }
        if index == self.state.current_index {
            tracing::trace!("Ignoring jump to current index {}", index);
            self.metrics.record_ignored();
            return Vec::new();
        }

        if self.state.busy {
            let replaced = self.state.pending_index();
            self.state.pending = Some(PendingJump { index, intent });
            self.metrics.record_coalesced(replaced.is_some());
            tracing::debug!(
                "Busy, deferring jump to {} (replaces {:?})",
                index,
                replaced
            );
            return vec![CarouselEvent::RequestCoalesced {
                pending: index,
                replaced,
            }];
        }

        self.start(index, intent)
    }

    fn start(&mut self, index: usize, intent: Option<Direction>) -> Vec<CarouselEvent> {
        let from = self.state.current_index;
        let direction =
            intent.unwrap_or_else(|| Direction::cyclic(from, index, self.slides.len()));

        let ticket = TransitionTicket(self.next_ticket);
        self.next_ticket += 1;

        self.state.direction = direction;
        self.state.busy = true;
        self.state.current_index = index;
        self.in_flight = Some(InFlight {
            ticket,
            started_at: Instant::now(),
        });
        self.metrics.record_transition_started();

        tracing::info!(
            "Transition {}: slide {} -> {} ({:?})",
            ticket,
            from,
            index,
            direction
        );

        let request = TransitionRequest {
            ticket,
            from,
            to: index,
            direction,
            intensity: self.intensity,
        };
        self.adapter.begin_transition(
            request,
            CompletionToken::new(ticket, self.completions.clone()),
        );

        vec![
            CarouselEvent::IndexChanged {
                index,
                previous: from,
                direction,
            },
            CarouselEvent::TransitionStarted {
                ticket,
                from,
                to: index,
                direction,
            },
        ]
    }

    fn drain_pending(&mut self) -> Vec<CarouselEvent> {
        match self.state.pending.take() {
            Some(pending) => {
                tracing::debug!("Replaying deferred jump to {}", pending.index);
                self.request(pending.index, pending.intent)
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CompletionReceiver, MockRenderAdapter, completion_channel};
    use std::sync::atomic::Ordering;

    fn slides(count: usize) -> Vec<Slide> {
        (0..count)
            .map(|i| Slide::new(format!("/images/{i}.jpg")))
            .collect()
    }

    /// Controller whose mock adapter accepts any number of transitions and drops the tokens
    fn controller(count: usize) -> (TransitionController, CompletionReceiver) {
        let mut adapter = MockRenderAdapter::new();
        adapter.expect_begin_transition().returning(|_, _| ());
        let (tx, rx) = completion_channel();
        (
            TransitionController::new(slides(count), Box::new(adapter), tx),
            rx,
        )
    }

    #[test]
    fn test_new_controller_is_idle_at_zero() {
        let (ctl, _rx) = controller(3);
        let state = ctl.state();

        assert_eq!(state.current_index, 0);
        assert!(!state.busy);
        assert_eq!(state.pending, None);
        assert_eq!(ctl.in_flight(), None);
    }

    #[test]
    fn test_jump_calls_adapter_once_with_request() {
        let mut adapter = MockRenderAdapter::new();
        adapter
            .expect_begin_transition()
            .withf(|req, token| {
                req.from == 0
                    && req.to == 2
                    && req.direction == Direction::Backward
                    && req.ticket == token.ticket()
                    && req.intensity.get() == 0.8
            })
            .times(1)
            .returning(|_, _| ());
        let (tx, _rx) = completion_channel();
        let mut ctl =
            TransitionController::new(slides(3), Box::new(adapter), tx).with_intensity(0.8);

        let events = ctl.request_jump(2);

        assert_eq!(ctl.index(), 2);
        assert!(ctl.is_busy());
        assert!(matches!(
            events[0],
            CarouselEvent::IndexChanged {
                index: 2,
                previous: 0,
                direction: Direction::Backward
            }
        ));
        assert!(matches!(events[1], CarouselEvent::TransitionStarted { to: 2, .. }));
    }

    #[test]
    fn test_jump_to_current_index_is_noop() {
        let mut adapter = MockRenderAdapter::new();
        adapter.expect_begin_transition().times(0);
        let (tx, _rx) = completion_channel();
        let mut ctl = TransitionController::new(slides(3), Box::new(adapter), tx);

        let events = ctl.request_jump(0);

        assert!(events.is_empty());
        assert_eq!(ctl.state(), ControllerState::default());
        assert_eq!(ctl.metrics().requests_ignored.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_out_of_range_jump_is_ignored() {
        let (mut ctl, _rx) = controller(3);

        assert!(ctl.request_jump(3).is_empty());
        assert!(ctl.request_jump(usize::MAX).is_empty());
        assert_eq!(ctl.index(), 0);
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_busy_requests_coalesce_to_latest() {
        let (mut ctl, mut rx) = controller(5);
        ctl.request_jump(1);
        let ticket = ctl.in_flight().unwrap();

        ctl.request_jump(2);
        ctl.request_jump(3);
        let events = ctl.request_jump(4);

        assert!(matches!(
            events[0],
            CarouselEvent::RequestCoalesced {
                pending: 4,
                replaced: Some(3)
            }
        ));
        assert_eq!(ctl.index(), 1);
        assert_eq!(ctl.state().pending_index(), Some(4));

        let events = ctl.on_transition_complete(ticket);

        assert_eq!(ctl.index(), 4);
        assert!(ctl.is_busy());
        assert_eq!(ctl.state().pending, None);
        assert!(matches!(events[0], CarouselEvent::TransitionCompleted { index: 1, .. }));
        assert!(matches!(events[1], CarouselEvent::IndexChanged { index: 4, previous: 1, .. }));
        assert!(rx.try_recv().is_err());
        assert_eq!(ctl.metrics().requests_superseded.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_jump_to_current_while_busy_keeps_pending() {
        let (mut ctl, _rx) = controller(3);
        ctl.request_jump(1);
        let ticket = ctl.in_flight().unwrap();
        ctl.request_jump(2);

        assert!(ctl.request_jump(1).is_empty());
        assert_eq!(ctl.state().pending_index(), Some(2));

        let events = ctl.on_transition_complete(ticket);

        assert_eq!(events.len(), 3);
        assert_eq!(ctl.index(), 2);
    }

    #[test]
    fn test_completion_without_pending_goes_idle() {
        let (mut ctl, _rx) = controller(3);
        ctl.request_jump(1);
        let ticket = ctl.in_flight().unwrap();

        let events = ctl.on_transition_complete(ticket);

        assert_eq!(events.len(), 1);
        assert!(!ctl.is_busy());
        assert_eq!(ctl.index(), 1);
    }

    #[test]
    fn test_next_and_prev_wrap() {
        let (mut ctl, _rx) = controller(3);

        ctl.request_prev();
        assert_eq!(ctl.index(), 2);
        assert_eq!(ctl.state().direction, Direction::Backward);
        let ticket = ctl.in_flight().unwrap();
        ctl.on_transition_complete(ticket);

        ctl.request_next();
        assert_eq!(ctl.index(), 0);
        assert_eq!(ctl.state().direction, Direction::Forward);
    }

    #[test]
    fn test_two_slides_keep_intent_direction() {
        let (mut ctl, _rx) = controller(2);

        ctl.request_prev();
        assert_eq!(ctl.index(), 1);
        assert_eq!(ctl.state().direction, Direction::Backward);
    }

    #[test]
    fn test_single_and_empty_decks_are_inert() {
        for count in [0, 1] {
            let mut adapter = MockRenderAdapter::new();
            adapter.expect_begin_transition().times(0);
            let (tx, _rx) = completion_channel();
            let mut ctl = TransitionController::new(slides(count), Box::new(adapter), tx);

            assert!(ctl.request_next().is_empty());
            assert!(ctl.request_prev().is_empty());
            assert!(ctl.request_jump(0).is_empty());
            assert_eq!(ctl.index(), 0);
        }
    }

    #[test]
    fn test_synchronous_completion_is_queued_not_reentrant() {
        let mut adapter = MockRenderAdapter::new();
        adapter
            .expect_begin_transition()
            .returning(|_, token| token.complete());
        let (tx, mut rx) = completion_channel();
        let mut ctl = TransitionController::new(slides(3), Box::new(adapter), tx);

        ctl.request_next();
        assert!(ctl.is_busy());

        let ticket = rx.try_recv().unwrap();
        ctl.on_transition_complete(ticket);
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let (mut ctl, _rx) = controller(3);
        ctl.request_next();
        let first = ctl.in_flight().unwrap();
        ctl.force_unblock();
        ctl.request_next();

        let events = ctl.on_transition_complete(first);

        assert!(events.is_empty());
        assert!(ctl.is_busy());
        assert_eq!(ctl.metrics().stale_completions.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_unblocks_and_applies_pending() {
        let (ctl, _rx) = controller(4);
        let mut ctl = ctl.with_watchdog(Duration::from_millis(1500));
        ctl.request_jump(1);
        ctl.request_jump(3);

        tokio::time::advance(Duration::from_millis(1499)).await;
        assert!(ctl.poll_watchdog(Instant::now()).is_empty());
        assert!(ctl.is_busy());

        tokio::time::advance(Duration::from_millis(1)).await;
        let events = ctl.poll_watchdog(Instant::now());

        assert!(matches!(
            events[0],
            CarouselEvent::WatchdogFired {
                pending: Some(3),
                ..
            }
        ));
        assert_eq!(ctl.index(), 3);
        assert!(ctl.is_busy());
        assert_eq!(ctl.metrics().watchdog_recoveries.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_watchdog_deadline_tracks_in_flight() {
        let (mut ctl, _rx) = controller(3);
        assert_eq!(ctl.watchdog_deadline(), None);

        ctl.request_next();
        assert!(ctl.watchdog_deadline().is_some());

        let ticket = ctl.in_flight().unwrap();
        ctl.on_transition_complete(ticket);
        assert_eq!(ctl.watchdog_deadline(), None);
    }

    #[test]
    fn test_tickets_increase() {
        let (mut ctl, _rx) = controller(3);
        ctl.request_next();
        let a = ctl.in_flight().unwrap();
        ctl.on_transition_complete(a);
        ctl.request_next();
        let b = ctl.in_flight().unwrap();

        assert!(b > a);
    }
}
