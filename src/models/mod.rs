//! Data models for the carousel engine.
//!
//! - [`Slide`]: immutable slide description (source reference, heading, alt text)
//! - [`ControllerState`]: the only mutable entity, owned by the transition controller
//! - [`CarouselConfig`]: behavior options loaded from `Carousel.yaml`
//! - [`CarouselFile`]: the full YAML document (options plus slide deck)

pub mod config;
pub mod slide;
pub mod state;

pub use config::{CarouselConfig, CarouselFile, ConfigError, SwipeAxis};
pub use slide::{Slide, SlideLabel, default_deck};
pub use state::{ControllerState, Direction, PendingJump};
