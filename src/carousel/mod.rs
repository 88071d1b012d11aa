//! Running carousel: a cloneable handle over the engine plus its driver task.
//!
//! The engine lives behind one mutex. Every mutation queues its events in an
//! outbox before the engine lock is released, so the outbox holds events in
//! commit order. Whoever finds no publisher running drains it; everyone else
//! leaves their events behind. Listeners run without any lock held and may call
//! back into the handle. A single tokio task owns the timers: it sleeps until the
//! earliest autoplay or watchdog deadline, and wakes early for completion
//! tickets or when a host call may have moved a deadline.

mod engine;

use crate::control::{CarouselControl, ListenerId};
use crate::controller::CarouselEvent;
use crate::gesture::{NavKey, PointerId, PointerPos};
use crate::metrics::Metrics;
use crate::models::{CarouselConfig, ConfigError, ControllerState, Slide, SlideLabel};
use crate::render::{CompletionReceiver, RenderAdapter, completion_channel};
use engine::Engine;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{Notify, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Capacity of the event broadcast; slow subscribers see `Lagged`
const EVENT_CAPACITY: usize = 64;

type Listener = Arc<dyn Fn(usize) + Send + Sync>;

struct Shared {
    engine: Mutex<Engine>,
    slides: Arc<[Slide]>,
    metrics: Arc<Metrics>,
    events: broadcast::Sender<CarouselEvent>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    outbox: Mutex<VecDeque<CarouselEvent>>,
    publishing: AtomicBool,
    wake: Arc<Notify>,
    shutdown: watch::Sender<bool>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn engine(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn outbox(&self) -> MutexGuard<'_, VecDeque<CarouselEvent>> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the engine and queue the produced events while still holding its lock.
    ///
    /// Returns false once the engine is closed.
    fn commit<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Engine) -> Vec<CarouselEvent>,
    {
        let mut engine = self.engine();
        if engine.is_closed() {
            return false;
        }
        let events = f(&mut engine);
        if !events.is_empty() {
            self.outbox().extend(events);
        }
        true
    }

    /// Drain the outbox in FIFO order.
    ///
    /// Only one caller publishes at a time. A call made while another thread (or an
    /// enclosing listener on this thread) is publishing returns at once and its events
    /// go out from that publisher, after everything committed before them.
    /// Must be called without the engine lock held.
    fn publish(&self) {
        loop {
            if self
                .publishing
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }

            {
                let _publisher = PublisherGuard(&self.publishing);
                while let Some(event) = self.next_event() {
                    self.deliver(event);
                }
            }

            // Events queued between the last pop and the release have no other publisher
            if self.outbox().is_empty() {
                return;
            }
        }
    }

    fn next_event(&self) -> Option<CarouselEvent> {
        self.outbox().pop_front()
    }

    /// Hand one event to listeners (index changes only) and subscribers
    fn deliver(&self, event: CarouselEvent) {
        if let Some(index) = event.committed_index() {
            let listeners: Vec<Listener> = self
                .listeners()
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            for listener in listeners {
                listener(index);
            }
        }
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Clears the publishing flag, also when a listener panics
struct PublisherGuard<'a>(&'a AtomicBool);

impl Drop for PublisherGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Error returned by [`Carousel::spawn`]
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("Carousel::spawn must be called from within a tokio runtime")]
    NoRuntime,
}

/// Handle to a running carousel.
///
/// Cheap to clone; every clone drives the same engine. Dropping the last handle
/// stops the driver task, as does [`shutdown`](Self::shutdown).
///
/// A listener that captures a `Carousel` keeps the engine alive, so autoplay keeps
/// running until `shutdown` is called. Capture a [`WeakCarousel`] from
/// [`downgrade`](Self::downgrade) instead when the listener needs the handle.
///
/// # Example
///
/// ```no_run
/// use hero_carousel::{Carousel, CarouselConfig, CarouselControl, InstantAdapter, default_deck};
///
/// # async fn demo() -> Result<(), hero_carousel::SpawnError> {
/// let carousel = Carousel::spawn(default_deck(), CarouselConfig::default(), InstantAdapter)?;
/// carousel.on_change(|index| println!("now showing slide {index}"));
/// carousel.jump_to(2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Carousel {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Carousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carousel")
            .field("engine", &*self.shared.engine())
            .finish()
    }
}

impl Carousel {
    /// Validate `config`, build the engine and start its driver task on the
    /// current tokio runtime.
    pub fn spawn<A>(
        slides: impl Into<Arc<[Slide]>>,
        config: CarouselConfig,
        adapter: A,
    ) -> Result<Self, SpawnError>
    where
        A: RenderAdapter + 'static,
    {
        config.validate()?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SpawnError::NoRuntime)?;

        let slides: Arc<[Slide]> = slides.into();
        let metrics = Arc::new(Metrics::new());
        let (completions_tx, completions_rx) = completion_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let wake = Arc::new(Notify::new());

        let mut engine = Engine::new(
            Arc::clone(&slides),
            config,
            Box::new(adapter),
            completions_tx,
            Arc::clone(&metrics),
        );
        engine.start(Instant::now());

        tracing::info!(
            "Carousel started with {} slides (autoplay: {}, interval: {:?})",
            slides.len(),
            engine.config().autoplay,
            engine.config().interval()
        );

        let shared = Arc::new(Shared {
            engine: Mutex::new(engine),
            slides,
            metrics,
            events,
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            outbox: Mutex::new(VecDeque::new()),
            publishing: AtomicBool::new(false),
            wake: Arc::clone(&wake),
            shutdown: shutdown_tx,
            driver: Mutex::new(None),
        });

        let driver = runtime.spawn(drive(
            Arc::downgrade(&shared),
            completions_rx,
            shutdown_rx,
            wake,
        ));
        *shared
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(driver);

        Ok(Self { shared })
    }

    /// Handle that does not keep the carousel alive
    pub fn downgrade(&self) -> WeakCarousel {
        WeakCarousel {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Register a callback fired once per committed index change
    pub fn on_change<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        let id = ListenerId(self.shared.next_listener.fetch_add(1, Ordering::Relaxed));
        self.shared.listeners().push((id, Arc::new(callback)));
        id
    }

    /// Returns false if the listener was already removed
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.shared.listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Receive every [`CarouselEvent`] from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CarouselEvent> {
        self.shared.events.subscribe()
    }

    /// Hover started
    pub fn pointer_enter(&self) {
        self.update(|engine, now| engine.pointer_enter(now));
    }

    /// Hover ended
    pub fn pointer_leave(&self) {
        self.update(|engine, now| engine.pointer_leave(now));
    }

    /// Page visibility changed
    pub fn set_visible(&self, visible: bool) {
        self.update(|engine, now| engine.set_visible(visible, now));
    }

    pub fn pointer_down(&self, id: PointerId, pos: PointerPos) {
        self.update(|engine, _| {
            engine.pointer_down(id, pos);
            Vec::new()
        });
    }

    pub fn pointer_move(&self, id: PointerId, pos: PointerPos) {
        self.update(|engine, now| engine.pointer_move(id, pos, now));
    }

    pub fn pointer_up(&self, id: PointerId) {
        self.update(|engine, _| {
            engine.pointer_up(id);
            Vec::new()
        });
    }

    pub fn pointer_cancel(&self) {
        self.update(|engine, _| {
            engine.pointer_cancel();
            Vec::new()
        });
    }

    pub fn key(&self, key: NavKey) {
        self.update(|engine, now| engine.key(key, now));
    }

    pub fn slide_count(&self) -> usize {
        self.shared.slides.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.shared.slides
    }

    pub fn current_slide(&self) -> Option<Slide> {
        self.shared.slides.get(self.index()).cloned()
    }

    /// Accessibility labels for every slide's indicator
    pub fn slide_labels(&self) -> Vec<SlideLabel> {
        let count = self.shared.slides.len();
        self.shared
            .slides
            .iter()
            .enumerate()
            .map(|(index, slide)| SlideLabel::for_slide(slide, index, count))
            .collect()
    }

    /// Elapsed fraction of the autoplay period; zero while paused or disabled
    pub fn autoplay_progress(&self) -> f32 {
        self.shared.engine().autoplay_progress(Instant::now())
    }

    pub fn is_busy(&self) -> bool {
        self.shared.engine().controller().is_busy()
    }

    pub fn state(&self) -> ControllerState {
        self.shared.engine().controller().state()
    }

    pub fn config(&self) -> CarouselConfig {
        self.shared.engine().config().clone()
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.shared.metrics)
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shared.shutdown.borrow()
    }

    /// Stop the driver and autoplay, release listeners and log a summary.
    ///
    /// Later calls on any clone of the handle are no-ops. Calling this twice is fine.
    pub fn shutdown(&self) {
        if self.shared.shutdown.send_replace(true) {
            return;
        }

        self.shared.engine().close();
        self.shared.listeners().clear();
        if let Some(driver) = self
            .shared
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            driver.abort();
        }

        tracing::info!("Carousel shut down");
        self.shared.metrics.log_summary();
    }

    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Engine, Instant) -> Vec<CarouselEvent>,
    {
        if !self.shared.commit(|engine| f(engine, Instant::now())) {
            return;
        }
        self.shared.wake.notify_one();
        self.shared.publish();
    }
}

/// Non-owning counterpart of [`Carousel`], for callbacks stored inside it
#[derive(Clone)]
pub struct WeakCarousel {
    shared: Weak<Shared>,
}

impl WeakCarousel {
    /// `None` once every `Carousel` handle has been dropped
    pub fn upgrade(&self) -> Option<Carousel> {
        self.shared.upgrade().map(|shared| Carousel { shared })
    }
}

impl std::fmt::Debug for WeakCarousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakCarousel")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

impl CarouselControl for Carousel {
    fn jump_to(&self, index: usize) {
        self.update(|engine, now| engine.jump_to(index, now));
    }

    fn next(&self) {
        self.update(|engine, now| engine.next(now));
    }

    fn prev(&self) {
        self.update(|engine, now| engine.prev(now));
    }

    fn index(&self) -> usize {
        self.shared.engine().controller().index()
    }
}

/// Driver loop: one iteration per completion, deadline or wake-up
async fn drive(
    shared: Weak<Shared>,
    mut completions: CompletionReceiver,
    mut shutdown: watch::Receiver<bool>,
    wake: Arc<Notify>,
) {
    tracing::debug!("Carousel driver started");

    loop {
        let wakeup = {
            let Some(shared) = shared.upgrade() else { break };
            let wakeup = shared.engine().next_wakeup();
            wakeup
        };

        tokio::select! {
            biased;

            // Also resolves once every handle is gone
            _ = shutdown.changed() => break,

            Some(ticket) = completions.recv() => {
                let Some(shared) = shared.upgrade() else { break };
                shared.commit(|engine| engine.complete(ticket, Instant::now()));
                shared.publish();
            }

            _ = sleep_until(wakeup) => {
                let Some(shared) = shared.upgrade() else { break };
                shared.commit(|engine| engine.tick(Instant::now()));
                shared.publish();
            }

            _ = wake.notified() => {}
        }
    }

    tracing::debug!("Carousel driver stopped");
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
