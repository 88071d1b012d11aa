//! Caption parallax: the heading block drifts against the pointer.

/// Screen-space rectangle of the banner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

const MAX_SHIFT_X_PX: f32 = 20.0;
const MAX_SHIFT_Y_PX: f32 = 16.0;

/// Caption translation for a pointer at `(x, y)`.
///
/// The pointer's offset from the banner center is normalized to `-0.5..0.5` and the
/// caption moves the opposite way, up to 10 px horizontally and 8 px vertically
/// at the edges. A degenerate rect yields no shift.
pub fn parallax_offset(pointer: (f32, f32), rect: ViewRect) -> (f32, f32) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return (0.0, 0.0);
    }
    let cx = rect.left + rect.width / 2.0;
    let cy = rect.top + rect.height / 2.0;
    let dx = (pointer.0 - cx) / rect.width;
    let dy = (pointer.1 - cy) / rect.height;
    (-dx * MAX_SHIFT_X_PX, -dy * MAX_SHIFT_Y_PX)
}
