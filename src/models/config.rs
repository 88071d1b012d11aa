use crate::models::slide::{Slide, default_deck};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Axis a swipe is measured along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAxis {
    #[default]
    Horizontal,
    Vertical,
}

/// Errors raised when a configuration cannot drive a carousel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Autoplay interval must be greater than zero")]
    ZeroInterval,

    #[error("Watchdog timeout must be greater than zero")]
    ZeroWatchdog,

    #[error("Intensity {0} is outside 0..=1")]
    IntensityOutOfRange(f32),

    #[error("Swipe threshold {0} must be a positive distance")]
    InvalidSwipeThreshold(f32),
}

/// Behavior options for one carousel.
///
/// Field names match the keys of the `carousel:` section in `Carousel.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Autoplay period in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Visual strength handed opaquely to the render adapter (0..=1)
    #[serde(default = "default_intensity")]
    pub intensity: f32,

    #[serde(default = "default_true")]
    pub autoplay: bool,

    /// Time after which a transition without a completion signal is forcibly ended
    #[serde(default = "default_watchdog_ms")]
    pub watchdog_ms: u64,

    #[serde(default = "default_swipe_threshold_px")]
    pub swipe_threshold_px: f32,

    #[serde(default)]
    pub swipe_axis: SwipeAxis,

    #[serde(default = "default_true")]
    pub pause_on_hover: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            intensity: default_intensity(),
            autoplay: true,
            watchdog_ms: default_watchdog_ms(),
            swipe_threshold_px: default_swipe_threshold_px(),
            swipe_axis: SwipeAxis::Horizontal,
            pause_on_hover: true,
        }
    }
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_millis(self.watchdog_ms)
    }

    /// Check that every value can drive a carousel
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.watchdog_ms == 0 {
            return Err(ConfigError::ZeroWatchdog);
        }
        if !(0.0..=1.0).contains(&self.intensity) {
            return Err(ConfigError::IntensityOutOfRange(self.intensity));
        }
        if !(self.swipe_threshold_px.is_finite() && self.swipe_threshold_px > 0.0) {
            return Err(ConfigError::InvalidSwipeThreshold(self.swipe_threshold_px));
        }
        Ok(())
    }
}

/// Contents of `Carousel.yaml`: behavior options plus the slide deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselFile {
    #[serde(default)]
    pub carousel: CarouselConfig,

    #[serde(default = "default_deck")]
    pub slides: Vec<Slide>,
}

impl Default for CarouselFile {
    fn default() -> Self {
        Self {
            carousel: CarouselConfig::default(),
            slides: default_deck(),
        }
    }
}

fn default_interval_ms() -> u64 {
    4500
}

fn default_intensity() -> f32 {
    0.55
}

fn default_watchdog_ms() -> u64 {
    1500
}

fn default_swipe_threshold_px() -> f32 {
    70.0
}

fn default_true() -> bool {
    true
}
