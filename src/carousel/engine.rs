// Carousel engine
//
// Everything the driver task and the host handle mutate, gathered behind one lock.
// Each operation takes the current instant and returns the events it produced.

use crate::autoplay::AutoplayTimer;
use crate::controller::{CarouselEvent, TransitionController};
use crate::gesture::{NavIntent, NavKey, PointerId, PointerPos, SwipeRecognizer};
use crate::metrics::Metrics;
use crate::models::{CarouselConfig, Slide};
use crate::render::{CompletionSender, RenderAdapter, TransitionTicket};
use std::sync::Arc;
use tokio::time::Instant;

pub(crate) struct Engine {
    controller: TransitionController,
    autoplay: AutoplayTimer,
    swipe: SwipeRecognizer,
    config: CarouselConfig,
    closed: bool,
}

impl Engine {
    pub(crate) fn new(
        slides: Arc<[Slide]>,
        config: CarouselConfig,
        adapter: Box<dyn RenderAdapter>,
        completions: CompletionSender,
        metrics: Arc<Metrics>,
    ) -> Self {
        let controller = TransitionController::new(slides, adapter, completions)
            .with_intensity(config.intensity)
            .with_watchdog(config.watchdog())
            .with_metrics(metrics);

        Self {
            controller,
            autoplay: AutoplayTimer::new(config.interval()),
            swipe: SwipeRecognizer::new(config.swipe_threshold_px, config.swipe_axis),
            config,
            closed: false,
        }
    }

    /// Arm autoplay if configured and there is something to rotate through
    pub(crate) fn start(&mut self, now: Instant) {
        if self.config.autoplay && self.controller.slide_count() > 1 {
            self.autoplay.start(now);
        } else {
            tracing::debug!(
                "Autoplay not started (enabled: {}, slides: {})",
                self.config.autoplay,
                self.controller.slide_count()
            );
        }
    }

    pub(crate) fn controller(&self) -> &TransitionController {
        &self.controller
    }

    pub(crate) fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn autoplay_progress(&self, now: Instant) -> f32 {
        self.autoplay.progress(now)
    }

    pub(crate) fn jump_to(&mut self, index: usize, now: Instant) -> Vec<CarouselEvent> {
        if self.closed {
            return Vec::new();
        }
        let events = self.controller.request_jump(index);
        self.observe(events, now)
    }

    pub(crate) fn next(&mut self, now: Instant) -> Vec<CarouselEvent> {
        if self.closed {
            return Vec::new();
        }
        let events = self.controller.request_next();
        self.observe(events, now)
    }

    pub(crate) fn prev(&mut self, now: Instant) -> Vec<CarouselEvent> {
        if self.closed {
            return Vec::new();
        }
        let events = self.controller.request_prev();
        self.observe(events, now)
    }

    pub(crate) fn complete(&mut self, ticket: TransitionTicket, now: Instant) -> Vec<CarouselEvent> {
        if self.closed {
            return Vec::new();
        }
        let events = self.controller.on_transition_complete(ticket);
        self.observe(events, now)
    }

    /// Handle whatever deadline has passed: watchdog first, then autoplay
    pub(crate) fn tick(&mut self, now: Instant) -> Vec<CarouselEvent> {
        if self.closed {
            return Vec::new();
        }
        let mut events = self.controller.poll_watchdog(now);

        if self.autoplay.poll(now) {
            if self.controller.is_busy() {
                tracing::trace!("Autoplay period elapsed mid-transition, skipping");
            } else {
                self.controller.metrics().record_autoplay_advance();
                events.extend(self.controller.request_next());
            }
        }

        self.observe(events, now)
    }

    /// Earliest instant the driver has to wake up for
    pub(crate) fn next_wakeup(&self) -> Option<Instant> {
        match (self.autoplay.deadline(), self.controller.watchdog_deadline()) {
            (Some(a), Some(w)) => Some(a.min(w)),
            (a, w) => a.or(w),
        }
    }

    pub(crate) fn pointer_enter(&mut self, now: Instant) -> Vec<CarouselEvent> {
        if self.closed || !self.config.pause_on_hover {
            return Vec::new();
        }
        if self.autoplay.pause(now) {
            tracing::debug!("Autoplay paused on hover");
            vec![CarouselEvent::AutoplayPaused]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn pointer_leave(&mut self, now: Instant) -> Vec<CarouselEvent> {
        if self.closed || !self.config.pause_on_hover {
            return Vec::new();
        }
        if self.autoplay.resume(now) {
            tracing::debug!("Autoplay resumed after hover");
            vec![CarouselEvent::AutoplayResumed]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool, now: Instant) -> Vec<CarouselEvent> {
        if self.closed || !self.autoplay.set_visible(visible, now) {
            return Vec::new();
        }
        if self.autoplay.is_running() {
            vec![CarouselEvent::AutoplayResumed]
        } else {
            vec![CarouselEvent::AutoplayPaused]
        }
    }

    pub(crate) fn pointer_down(&mut self, id: PointerId, pos: PointerPos) {
        if !self.closed {
            self.swipe.press(id, pos);
        }
    }

    pub(crate) fn pointer_move(
        &mut self,
        id: PointerId,
        pos: PointerPos,
        now: Instant,
    ) -> Vec<CarouselEvent> {
        if self.closed {
            return Vec::new();
        }
        match self.swipe.motion(id, pos) {
            Some(intent) => {
                self.controller.metrics().record_swipe();
                self.navigate(intent, now)
            }
            None => Vec::new(),
        }
    }

    pub(crate) fn pointer_up(&mut self, id: PointerId) {
        self.swipe.release(id);
    }

    pub(crate) fn pointer_cancel(&mut self) {
        self.swipe.cancel();
    }

    pub(crate) fn key(&mut self, key: NavKey, now: Instant) -> Vec<CarouselEvent> {
        match key.intent() {
            Some(intent) if !self.closed => self.navigate(intent, now),
            _ => Vec::new(),
        }
    }

    /// Stop autoplay, drop the pending jump and refuse further requests
    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.autoplay.stop();
        self.swipe.cancel();
        self.controller.reset_busy();
    }

    fn navigate(&mut self, intent: NavIntent, now: Instant) -> Vec<CarouselEvent> {
        match intent {
            NavIntent::Next => self.next(now),
            NavIntent::Prev => self.prev(now),
        }
    }

    /// Restart the autoplay period whenever the index was committed
    fn observe(&mut self, events: Vec<CarouselEvent>, now: Instant) -> Vec<CarouselEvent> {
        if events.iter().any(|e| e.committed_index().is_some()) {
            self.autoplay.reset_on_index_change(now);
        }
        events
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("controller", &self.controller)
            .field("autoplay", &self.autoplay)
            .field("closed", &self.closed)
            .finish()
    }
}
