//! Direction-aware blur cross-fade.
//!
//! The incoming slide enters blurred and slightly zoomed and settles to rest; the
//! outgoing slide blurs away. Forward and backward transitions use different zoom
//! amounts so the motion reads as going deeper or coming back.

use crate::models::Direction;
use std::time::Duration;

/// CSS-like visual state of one slide layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub opacity: f32,
    pub scale: f32,
    pub blur_px: f32,
}

impl LayerStyle {
    pub const REST: LayerStyle = LayerStyle {
        opacity: 1.0,
        scale: 1.0,
        blur_px: 0.0,
    };

    fn lerp(self, to: LayerStyle, p: f32) -> LayerStyle {
        if p >= 1.0 {
            return to;
        }
        LayerStyle {
            opacity: self.opacity + (to.opacity - self.opacity) * p,
            scale: self.scale + (to.scale - self.scale) * p,
            blur_px: self.blur_px + (to.blur_px - self.blur_px) * p,
        }
    }
}

/// Cubic bezier easing curve through (0,0), (x1,y1), (x2,y2), (1,1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CubicBezier {
    /// Strong ease-out used by the banner
    pub const EXPO_OUT: CubicBezier = CubicBezier {
        x1: 0.16,
        y1: 1.0,
        x2: 0.3,
        y2: 1.0,
    };

    fn sample(a1: f32, a2: f32, s: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a1 + 3.0 * inv * s * s * a2 + s * s * s
    }

    fn slope(a1: f32, a2: f32, s: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * a1 + 6.0 * inv * s * (a2 - a1) + 3.0 * s * s * (1.0 - a2)
    }

    /// Eased value for linear progress `t`
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }

        // Newton first, bisection if the slope flattens out
        let mut s = t;
        for _ in 0..8 {
            let err = Self::sample(self.x1, self.x2, s) - t;
            if err.abs() < 1e-6 {
                return Self::sample(self.y1, self.y2, s);
            }
            let d = Self::slope(self.x1, self.x2, s);
            if d.abs() < 1e-6 {
                break;
            }
            s = (s - err / d).clamp(0.0, 1.0);
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        s = t;
        for _ in 0..32 {
            let x = Self::sample(self.x1, self.x2, s);
            if (x - t).abs() < 1e-6 {
                break;
            }
            if x < t {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) * 0.5;
        }
        Self::sample(self.y1, self.y2, s)
    }
}

/// Enter / rest / exit styles and timings of the cross-fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeVariants {
    pub enter_duration: Duration,
    pub exit_duration: Duration,
    pub easing: CubicBezier,
}

impl Default for CrossfadeVariants {
    fn default() -> Self {
        Self {
            enter_duration: Duration::from_millis(900),
            exit_duration: Duration::from_millis(700),
            easing: CubicBezier::EXPO_OUT,
        }
    }
}

impl CrossfadeVariants {
    /// Starting style of the incoming slide
    pub fn enter(&self, direction: Direction) -> LayerStyle {
        LayerStyle {
            opacity: 0.0,
            scale: match direction {
                Direction::Forward => 1.05,
                Direction::Backward => 1.15,
            },
            blur_px: 6.0,
        }
    }

    /// Final style of the outgoing slide
    pub fn exit(&self, direction: Direction) -> LayerStyle {
        LayerStyle {
            opacity: 0.0,
            scale: match direction {
                Direction::Forward => 1.1,
                Direction::Backward => 1.0,
            },
            blur_px: 10.0,
        }
    }

    /// Time until both layers are at rest; completion is signaled here
    pub fn duration(&self) -> Duration {
        self.enter_duration.max(self.exit_duration)
    }

    /// Styles of (incoming, outgoing) layers `elapsed` into the transition
    pub fn sample(&self, direction: Direction, elapsed: Duration) -> (LayerStyle, LayerStyle) {
        let progress = |total: Duration| {
            if total.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f32() / total.as_secs_f32()).min(1.0)
            }
        };
        let p_in = self.easing.apply(progress(self.enter_duration));
        let p_out = self.easing.apply(progress(self.exit_duration));

        (
            self.enter(direction).lerp(LayerStyle::REST, p_in),
            LayerStyle::REST.lerp(self.exit(direction), p_out),
        )
    }
}
