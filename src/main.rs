//! hero-carousel demo host
//!
//! Runs a carousel without a screen: a ripple ticker adapter plays every
//! transition at 60 fps and logs its frames, and all carousel events are logged.
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/hero-carousel.<date>
//! 2. Create tokio runtime
//! 3. Load `config/Carousel.yaml` (defaults when missing) plus `HERO_CAROUSEL_*` overrides
//! 4. Spawn the carousel and an event logger
//! 5. Run until Ctrl-C, or for `HERO_CAROUSEL_DEMO_SECS` seconds if set
//! 6. Shut the carousel down and log its metrics
//!
//! Set `HERO_CAROUSEL_LOG_JSON=1` for JSON log files.

use anyhow::{Context, Result};
use hero_carousel::gesture::PointerPos;
use hero_carousel::render::ripple::RippleFrame;
use hero_carousel::render::{FrameSample, TickerAdapter};
use hero_carousel::{APP_NAME, Carousel, CarouselControl, CarouselEvent, ConfigManager, NavKey, VERSION};
use std::time::Duration;

fn main() -> Result<()> {
    let json_logs = std::env::var_os("HERO_CAROUSEL_LOG_JSON").is_some();
    let _log_guard = if json_logs {
        hero_carousel::logging::setup_json_logging("logs", "hero-carousel", false)?
    } else {
        hero_carousel::logging::setup_logging_with_console("logs", "hero-carousel", false, true)?
    };

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("carousel-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    let result = runtime.block_on(run());

    runtime.shutdown_timeout(Duration::from_secs(2));
    tracing::info!("Demo shutdown complete");

    result
}

async fn run() -> Result<()> {
    let config_manager = ConfigManager::new("config")?;
    let file = config_manager.load_with_env()?;

    tracing::info!(
        "Loaded {} slides from {} (interval {:?}, intensity {})",
        file.slides.len(),
        config_manager.config_path(),
        file.carousel.interval(),
        file.carousel.intensity
    );

    let adapter = TickerAdapter::ripple(|sample: FrameSample<RippleFrame>| {
        if sample.frame.frame == 1 {
            tracing::debug!(
                "Transition {} rendering {} -> {}",
                sample.ticket,
                sample.from,
                sample.to
            );
        }
        tracing::trace!(
            "{} frame {}: alpha {:.2}, displacement {:.1}px",
            sample.ticket,
            sample.frame.frame,
            sample.frame.incoming_alpha,
            sample.frame.displacement
        );
    });

    let carousel = Carousel::spawn(file.slides, file.carousel, adapter)
        .context("Invalid carousel configuration")?;

    for label in carousel.slide_labels() {
        tracing::info!(
            "{}: {} ({})",
            label.control_label,
            label.heading.as_deref().unwrap_or("untitled"),
            label.alt_text
        );
    }

    carousel.on_change(|index| tracing::info!("Now showing slide {}", index + 1));

    let mut events = carousel.subscribe();
    let logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CarouselEvent::IndexChanged { .. }) => {}
                Ok(event) => tracing::debug!("Carousel event: {:?}", event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("Event logger lagged, missed {} events", missed);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // A little scripted input so the demo exercises every request path
    let scripted = carousel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        scripted.key(NavKey::ArrowRight);
        tokio::time::sleep(Duration::from_millis(300)).await;
        scripted.pointer_down(0, PointerPos::new(400.0, 200.0));
        scripted.pointer_move(0, PointerPos::new(490.0, 205.0));
        scripted.pointer_up(0);
        scripted.jump_to(0);
    });

    match demo_duration()? {
        Some(duration) => {
            tracing::info!("Running demo for {:?}", duration);
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
            }
        }
        None => {
            tracing::info!("Running demo until Ctrl-C");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
        }
    }

    carousel.shutdown();
    drop(carousel);
    logger.abort();

    Ok(())
}

fn demo_duration() -> Result<Option<Duration>> {
    match std::env::var("HERO_CAROUSEL_DEMO_SECS") {
        Ok(secs) => {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("HERO_CAROUSEL_DEMO_SECS is not a number: {}", secs))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}
