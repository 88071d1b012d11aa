use serde::{Deserialize, Serialize};

/// One entry of the hero banner.
///
/// Slides are immutable once handed to the engine. The `source` is an opaque
/// reference (URL, asset key, file path) that only the render adapter interprets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,

    #[serde(rename = "alt", default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl Slide {
    /// Create a slide with only a source reference
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            heading: None,
            subheading: None,
            alt_text: None,
        }
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn with_subheading(mut self, subheading: impl Into<String>) -> Self {
        self.subheading = Some(subheading.into());
        self
    }

    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }

    /// Alt text for the image, falling back to "Slide N" (1-based)
    pub fn alt_or_default(&self, index: usize) -> String {
        self.alt_text
            .clone()
            .unwrap_or_else(|| format!("Slide {}", index + 1))
    }
}

/// Labels a host needs to render an indicator dot or announce the slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideLabel {
    pub index: usize,
    pub count: usize,
    pub heading: Option<String>,
    pub alt_text: String,
    /// Label for the "go to" control of this slide (e.g. "Go to slide 2")
    pub control_label: String,
}

impl SlideLabel {
    pub fn for_slide(slide: &Slide, index: usize, count: usize) -> Self {
        Self {
            index,
            count,
            heading: slide.heading.clone(),
            alt_text: slide.alt_or_default(index),
            control_label: format!("Go to slide {}", index + 1),
        }
    }
}

/// The three-slide deck the banner ships with when no slides are configured.
pub fn default_deck() -> Vec<Slide> {
    vec![
        Slide::new("/images/main-banner.jpg")
            .with_heading("Our Wedding Day")
            .with_subheading("A celebration of love")
            .with_alt_text("Slide 1"),
        Slide::new("/images/main-banner_2.jpg")
            .with_heading("Captured Moments")
            .with_subheading("Memories to cherish")
            .with_alt_text("Slide 2"),
        Slide::new("/images/main-banner_3.jpg")
            .with_heading("Together Forever")
            .with_subheading("Join our story")
            .with_alt_text("Slide 3"),
    ]
}
