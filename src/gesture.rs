// Gesture and keyboard input
//
// Turns raw pointer and key events into navigation intents. Nothing here touches
// the controller; the carousel maps intents onto next/prev requests.

use crate::models::SwipeAxis;

/// Default swipe distance in pixels
pub const DEFAULT_SWIPE_THRESHOLD_PX: f32 = 70.0;

/// What an input gesture asks the carousel to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    Next,
    Prev,
}

/// Pointer position in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

impl PointerPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn along(self, axis: SwipeAxis) -> f32 {
        match axis {
            SwipeAxis::Horizontal => self.x,
            SwipeAxis::Vertical => self.y,
        }
    }
}

/// Identifies a pointer (touch id, mouse = 0)
pub type PointerId = u64;

#[derive(Debug, Clone, Copy)]
struct Tracked {
    id: PointerId,
    origin: f32,
    armed: bool,
}

/// Single-pointer swipe recognizer.
///
/// A press arms the recognizer. Motion past the threshold along the swipe axis
/// yields one intent and disarms it until the next press. Dragging toward the
/// start of the axis (left/up) means next, toward the end means previous.
/// Other pointers are ignored while one is tracked.
#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    threshold: f32,
    axis: SwipeAxis,
    active: Option<Tracked>,
}

impl Default for SwipeRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX, SwipeAxis::Horizontal)
    }
}

impl SwipeRecognizer {
    pub fn new(threshold: f32, axis: SwipeAxis) -> Self {
        Self {
            threshold,
            axis,
            active: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.active.is_some()
    }

    /// Start tracking `id` unless another pointer is already down
    pub fn press(&mut self, id: PointerId, pos: PointerPos) {
        if let Some(active) = self.active {
            if active.id != id {
                tracing::trace!("Ignoring press of pointer {} while tracking {}", id, active.id);
                return;
            }
        }
        self.active = Some(Tracked {
            id,
            origin: pos.along(self.axis),
            armed: true,
        });
    }

    /// Feed a move; returns an intent the first time the threshold is crossed
    pub fn motion(&mut self, id: PointerId, pos: PointerPos) -> Option<NavIntent> {
        let active = self.active.as_mut().filter(|a| a.id == id && a.armed)?;
        let delta = pos.along(self.axis) - active.origin;
        if delta.abs() <= self.threshold {
            return None;
        }

        active.armed = false;
        let intent = if delta < 0.0 {
            NavIntent::Next
        } else {
            NavIntent::Prev
        };
        tracing::debug!("Swipe {:?} recognized (delta {:.1}px)", intent, delta);
        Some(intent)
    }

    /// End tracking for `id`; a release never produces an intent
    pub fn release(&mut self, id: PointerId) {
        if self.active.is_some_and(|a| a.id == id) {
            self.active = None;
        }
    }

    /// Drop the tracked pointer (pointer cancel, focus loss)
    pub fn cancel(&mut self) {
        self.active = None;
    }
}

/// Keys the banner reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    Other,
}

impl NavKey {
    /// Map a DOM-style key name
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => NavKey::ArrowLeft,
            "ArrowRight" => NavKey::ArrowRight,
            _ => NavKey::Other,
        }
    }

    pub fn intent(self) -> Option<NavIntent> {
        match self {
            NavKey::ArrowRight => Some(NavIntent::Next),
            NavKey::ArrowLeft => Some(NavIntent::Prev),
            NavKey::Other => None,
        }
    }
}
