//! Imperative control surface for hosts that hold a carousel handle.

/// Navigation calls a host can make on a running carousel.
///
/// All calls are non-blocking and never fail: invalid or redundant requests are
/// ignored, and requests made mid-transition are coalesced.
pub trait CarouselControl {
    /// Go to slide `index`
    fn jump_to(&self, index: usize);

    fn next(&self);

    fn prev(&self);

    /// Current slide index
    fn index(&self) -> usize;
}

/// Handle for removing an `on_change` callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}
