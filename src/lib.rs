// hero-carousel - transition engine for a hero banner image carousel
//
// This is the library crate containing the engine, its input handling and the
// render adapter boundary. The binary crate (main.rs) is a small demo host.

pub mod autoplay;
pub mod carousel;
pub mod config;
pub mod control;
pub mod controller;
pub mod gesture;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod render;

// Re-export commonly used types for convenience
pub use carousel::{Carousel, SpawnError, WeakCarousel};
pub use config::ConfigManager;
pub use control::{CarouselControl, ListenerId};
pub use controller::{CarouselEvent, TransitionController};
pub use gesture::{NavIntent, NavKey, PointerPos, SwipeRecognizer};
pub use metrics::Metrics;
pub use models::{
    CarouselConfig, CarouselFile, ConfigError, ControllerState, Direction, Slide, SlideLabel,
    SwipeAxis, default_deck,
};
pub use render::{
    CompletionToken, InstantAdapter, Intensity, RenderAdapter, TransitionRequest,
    TransitionTicket,
};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
