//! Displacement ripple with a Ken-Burns drift.
//!
//! A transition is three 60-frame segments. The incoming slide fades in over the
//! first 72 frames while a noise displacement swells and falls back along a
//! half sine; afterwards the displacement decays geometrically. Both slides zoom
//! slowly the whole time. Adapters sample one [`RippleFrame`] per display frame
//! and apply it however their backend allows (GPU filter, canvas, CSS).

use crate::render::Intensity;

/// Frames per segment (~1 s at 60 fps)
pub const SEGMENT_FRAMES: u32 = 60;

/// Peak displacement in pixels at intensity 1.0
pub const MAX_DISPLACEMENT_PX: f32 = 180.0;

const DISPLACEMENT_DECAY: f32 = 0.92;
const NOISE_DRIFT: (f32, f32) = (1.3, 0.9);
const OUTGOING_START_SCALE: f32 = 1.02;
const INCOMING_START_SCALE: f32 = 1.06;
const OUTGOING_ZOOM_PER_FRAME: f32 = 0.0008;
const INCOMING_ZOOM_PER_FRAME: f32 = 0.0006;

/// Visual parameters for one frame of a ripple transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleFrame {
    /// 1-based frame number
    pub frame: u32,
    pub incoming_alpha: f32,
    /// Displacement filter scale in pixels, applied on both axes
    pub displacement: f32,
    /// Scroll offset of the noise texture
    pub noise_offset: (f32, f32),
    pub outgoing_scale: f32,
    pub incoming_scale: f32,
}

/// Stateful frame generator for one ripple transition
#[derive(Debug, Clone)]
pub struct RippleTimeline {
    intensity: f32,
    frame: u32,
    displacement: f32,
    noise_offset: (f32, f32),
    outgoing_scale: f32,
    incoming_scale: f32,
}

impl RippleTimeline {
    pub fn new(intensity: Intensity) -> Self {
        Self {
            intensity: intensity.get(),
            frame: 0,
            displacement: 0.0,
            noise_offset: (0.0, 0.0),
            outgoing_scale: OUTGOING_START_SCALE,
            incoming_scale: INCOMING_START_SCALE,
        }
    }

    /// Fade-in, hold and settle
    pub fn total_frames() -> u32 {
        SEGMENT_FRAMES * 3
    }

    /// Frame at which the incoming slide is fully opaque
    pub fn fade_frames() -> u32 {
        (SEGMENT_FRAMES * 6).div_ceil(5)
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= Self::total_frames()
    }

    /// Advance one frame; `None` once the timeline is exhausted
    pub fn step(&mut self) -> Option<RippleFrame> {
        if self.is_finished() {
            return None;
        }
        self.frame += 1;
        let t = self.frame as f32;
        let d = SEGMENT_FRAMES as f32;

        self.noise_offset.0 += NOISE_DRIFT.0;
        self.noise_offset.1 += NOISE_DRIFT.1;

        let incoming_alpha = if self.frame <= SEGMENT_FRAMES * 2 {
            self.displacement = self.intensity
                * MAX_DISPLACEMENT_PX
                * (std::f32::consts::PI * t / (d * 2.0)).sin();
            ease_out_cubic((t / (d * 1.2)).min(1.0))
        } else {
            self.displacement *= DISPLACEMENT_DECAY;
            1.0
        };

        self.outgoing_scale += OUTGOING_ZOOM_PER_FRAME;
        self.incoming_scale += INCOMING_ZOOM_PER_FRAME;

        Some(RippleFrame {
            frame: self.frame,
            incoming_alpha,
            displacement: self.displacement,
            noise_offset: self.noise_offset,
            outgoing_scale: self.outgoing_scale,
            incoming_scale: self.incoming_scale,
        })
    }
}

fn ease_out_cubic(p: f32) -> f32 {
    1.0 - (1.0 - p).powi(3)
}
