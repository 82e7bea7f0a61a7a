//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Dimensions after shrinking so neither side exceeds `max`.
///
/// Aspect ratio is preserved and images are never enlarged: a source that
/// already fits is returned unchanged.
///
/// # Examples
/// ```
/// # use museum_collage::imaging::bounded_dimensions;
/// assert_eq!(bounded_dimensions((4000, 3000), 1000), (1000, 750));
/// assert_eq!(bounded_dimensions((600, 900), 1000), (600, 900));
/// ```
pub fn bounded_dimensions(source: (u32, u32), max: u32) -> (u32, u32) {
    let (w, h) = source;
    if w <= max && h <= max {
        return (w, h);
    }

    if w >= h {
        // Landscape or square: width is the long edge
        let scaled = (h as f64 * max as f64 / w as f64).round() as u32;
        (max, scaled.max(1))
    } else {
        let scaled = (w as f64 * max as f64 / h as f64).round() as u32;
        (scaled.max(1), max)
    }
}

/// Largest dimensions with the source's aspect ratio that fit inside `bounds`.
///
/// Unlike [`bounded_dimensions`] this scales up as well as down, the way an
/// image stretches to fill its grid cell.
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;
    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Size of the collage once fitted inside a frame.
///
/// The collage gets the frame's width minus `margin`; if the resulting height
/// overshoots the frame's height minus `margin`, height is pinned instead and
/// the width follows. Fractional pixels are truncated.
///
/// Returns `None` when the frame is not larger than the margin in both
/// dimensions, or the collage is empty.
pub fn frame_fit(collage: (u32, u32), frame: (u32, u32), margin: u32) -> Option<(u32, u32)> {
    let (col_w, col_h) = collage;
    let (frame_w, frame_h) = frame;
    if col_w == 0 || col_h == 0 || frame_w <= margin || frame_h <= margin {
        return None;
    }

    let ratio = col_w as f64 / col_h as f64;
    let max_h = frame_h - margin;

    let mut w = frame_w - margin;
    let mut h = (w as f64 / ratio) as u32;
    if h > max_h {
        h = max_h;
        w = (h as f64 * ratio) as u32;
    }
    Some((w.max(1), h.max(1)))
}

/// Offset that centers `inner` inside `outer` (negative if `inner` is larger).
pub fn centered_offset(outer: (u32, u32), inner: (u32, u32)) -> (i64, i64) {
    (
        (outer.0 as i64 - inner.0 as i64).div_euclid(2),
        (outer.1 as i64 - inner.1 as i64).div_euclid(2),
    )
}
