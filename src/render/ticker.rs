//! Frame-driven render adapter running on the tokio clock.
//!
//! [`TickerAdapter`] plays a [`FramePlan`] at a fixed frame rate, hands every frame
//! to a sink (the actual drawing code) and completes the transition's token once
//! the plan reaches its completion frame. Frames after that point are a settle
//! phase that keeps running until the plan ends or the next transition starts.

use crate::models::Direction;
use crate::render::crossfade::{CrossfadeVariants, LayerStyle};
use crate::render::ripple::{RippleFrame, RippleTimeline};
use crate::render::{CompletionToken, RenderAdapter, TransitionRequest, TransitionTicket};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default display rate
pub const DEFAULT_FPS: u32 = 60;

/// A sequence of frames for one transition
pub trait FramePlan: Send + 'static {
    type Frame: Send + std::fmt::Debug + 'static;

    /// 1-based frame after which the transition counts as complete
    fn completion_frame(&self) -> u32;

    /// Next frame, or `None` when the plan is exhausted
    fn next_frame(&mut self) -> Option<Self::Frame>;
}

impl FramePlan for RippleTimeline {
    type Frame = RippleFrame;

    fn completion_frame(&self) -> u32 {
        RippleTimeline::fade_frames()
    }

    fn next_frame(&mut self) -> Option<RippleFrame> {
        self.step()
    }
}

/// Incoming and outgoing layer styles for one cross-fade frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeFrame {
    pub frame: u32,
    pub incoming: LayerStyle,
    pub outgoing: LayerStyle,
}

/// [`CrossfadeVariants`] sampled at a fixed frame rate
#[derive(Debug, Clone)]
pub struct CrossfadeTimeline {
    variants: CrossfadeVariants,
    direction: Direction,
    fps: u32,
    frame: u32,
}

impl CrossfadeTimeline {
    pub fn new(variants: CrossfadeVariants, direction: Direction, fps: u32) -> Self {
        Self {
            variants,
            direction,
            fps: fps.max(1),
            frame: 0,
        }
    }

    pub fn total_frames(&self) -> u32 {
        let frames = self.variants.duration().as_secs_f64() * self.fps as f64;
        ((frames - 1e-9).ceil() as u32).max(1)
    }
}

impl FramePlan for CrossfadeTimeline {
    type Frame = CrossfadeFrame;

    fn completion_frame(&self) -> u32 {
        self.total_frames()
    }

    fn next_frame(&mut self) -> Option<CrossfadeFrame> {
        let total = self.total_frames();
        if self.frame >= total {
            return None;
        }
        self.frame += 1;
        let elapsed = self
            .variants
            .duration()
            .mul_f64(self.frame as f64 / total as f64);
        let (incoming, outgoing) = self.variants.sample(self.direction, elapsed);
        Some(CrossfadeFrame {
            frame: self.frame,
            incoming,
            outgoing,
        })
    }
}

/// One frame delivered to the drawing code
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSample<F> {
    pub ticket: TransitionTicket,
    pub from: usize,
    pub to: usize,
    pub frame: F,
}

type PlanFactory<P> = Box<dyn Fn(&TransitionRequest) -> P + Send>;
type FrameSink<F> = Arc<Mutex<Box<dyn FnMut(FrameSample<F>) + Send>>>;

/// Render adapter that plays a [`FramePlan`] per transition on a tokio interval
pub struct TickerAdapter<P: FramePlan> {
    make_plan: PlanFactory<P>,
    sink: FrameSink<P::Frame>,
    frame_interval: Duration,
    running: Option<JoinHandle<()>>,
}

impl<P: FramePlan> std::fmt::Debug for TickerAdapter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerAdapter")
            .field("frame_interval", &self.frame_interval)
            .field("running", &self.running.is_some())
            .finish()
    }
}

impl<P: FramePlan> TickerAdapter<P> {
    pub fn new<F, S>(fps: u32, make_plan: F, sink: S) -> Self
    where
        F: Fn(&TransitionRequest) -> P + Send + 'static,
        S: FnMut(FrameSample<P::Frame>) + Send + 'static,
    {
        Self {
            make_plan: Box::new(make_plan),
            sink: Arc::new(Mutex::new(Box::new(sink))),
            frame_interval: frame_interval(fps),
            running: None,
        }
    }
}

impl TickerAdapter<RippleTimeline> {
    /// Ripple transitions at 60 fps
    pub fn ripple<S>(sink: S) -> Self
    where
        S: FnMut(FrameSample<RippleFrame>) + Send + 'static,
    {
        Self::new(DEFAULT_FPS, |req| RippleTimeline::new(req.intensity), sink)
    }
}

impl TickerAdapter<CrossfadeTimeline> {
    /// Blur cross-fades at 60 fps
    pub fn crossfade<S>(variants: CrossfadeVariants, sink: S) -> Self
    where
        S: FnMut(FrameSample<CrossfadeFrame>) + Send + 'static,
    {
        Self::new(
            DEFAULT_FPS,
            move |req| CrossfadeTimeline::new(variants, req.direction, DEFAULT_FPS),
            sink,
        )
    }
}

impl<P: FramePlan> RenderAdapter for TickerAdapter<P> {
    fn begin_transition(&mut self, request: TransitionRequest, done: CompletionToken) {
        // A previous transition may still be settling
        if let Some(previous) = self.running.take() {
            previous.abort();
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    "No tokio runtime for transition {}, completing without animation",
                    request.ticket
                );
                done.complete();
                return;
            }
        };

        let mut plan = (self.make_plan)(&request);
        let sink = Arc::clone(&self.sink);
        let frame_interval = self.frame_interval;

        self.running = Some(handle.spawn(async move {
            let mut interval = tokio::time::interval(frame_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let completion_frame = plan.completion_frame().max(1);
            let mut done = Some(done);
            let mut played = 0u32;

            while let Some(frame) = plan.next_frame() {
                interval.tick().await;
                played += 1;
                {
                    let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
                    (&mut **sink)(FrameSample {
                        ticket: request.ticket,
                        from: request.from,
                        to: request.to,
                        frame,
                    });
                }
                if played >= completion_frame {
                    if let Some(token) = done.take() {
                        tracing::trace!(
                            "Transition {} visually complete after {} frames",
                            request.ticket,
                            played
                        );
                        token.complete();
                    }
                }
            }

            // Plans shorter than their completion frame still complete
            if let Some(token) = done.take() {
                token.complete();
            }
        }));
    }
}

fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Intensity, completion_channel};

    fn request(ticket: u64) -> TransitionRequest {
        TransitionRequest {
            ticket: TransitionTicket(ticket),
            from: 0,
            to: 1,
            direction: Direction::Forward,
            intensity: Intensity::new(0.6),
        }
    }

    #[test]
    fn test_crossfade_timeline_frames() {
        let mut timeline =
            CrossfadeTimeline::new(CrossfadeVariants::default(), Direction::Forward, 60);
        assert_eq!(timeline.total_frames(), 54);

        let frames: Vec<_> = std::iter::from_fn(|| timeline.next_frame()).collect();
        assert_eq!(frames.len(), 54);
        assert_eq!(frames.last().unwrap().incoming, LayerStyle::REST);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ripple_completes_at_fade_end() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&frames);
        let mut adapter = TickerAdapter::ripple(move |sample: FrameSample<RippleFrame>| {
            seen.lock().unwrap().push(sample.frame.frame);
        });
        let (tx, mut rx) = completion_channel();

        adapter.begin_transition(request(1), CompletionToken::new(TransitionTicket(1), tx));

        let ticket = rx.recv().await.unwrap();
        assert_eq!(ticket, TransitionTicket(1));
        assert_eq!(
            *frames.lock().unwrap().last().unwrap(),
            RippleTimeline::fade_frames()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_transition_aborts_settling_one() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&frames);
        let mut adapter = TickerAdapter::ripple(move |sample: FrameSample<RippleFrame>| {
            seen.lock().unwrap().push(sample.ticket);
        });
        let (tx, mut rx) = completion_channel();

        adapter.begin_transition(request(1), CompletionToken::new(TransitionTicket(1), tx.clone()));
        assert_eq!(rx.recv().await.unwrap(), TransitionTicket(1));

        adapter.begin_transition(request(2), CompletionToken::new(TransitionTicket(2), tx));
        assert_eq!(rx.recv().await.unwrap(), TransitionTicket(2));

        let frames = frames.lock().unwrap();
        let first_of_second = frames
            .iter()
            .position(|t| *t == TransitionTicket(2))
            .unwrap();
        assert!(frames[first_of_second..]
            .iter()
            .all(|t| *t == TransitionTicket(2)));
    }

    #[test]
    fn test_without_runtime_completes_immediately() {
        let mut adapter = TickerAdapter::crossfade(CrossfadeVariants::default(), |_| {});
        let (tx, mut rx) = completion_channel();

        adapter.begin_transition(request(5), CompletionToken::new(TransitionTicket(5), tx));

        assert_eq!(rx.try_recv().unwrap(), TransitionTicket(5));
    }
}
