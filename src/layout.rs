//! Grid layout math.
//!
//! Images fill a row-major grid. How many columns it gets depends on the
//! strategy:
//!
//! | Strategy | Columns |
//! |---|---|
//! | Frame aspect `r` | `round(sqrt(n × r))` (ties to even) |
//! | Fallback aspect `r` | `ceil(sqrt(n × r))` |
//! | Fixed width, max `m` | `min(m, n)` |
//!
//! In every case `columns` is clamped to `1..=n` and
//! `rows = ceil(n / columns)`, so `rows × columns ≥ n` and a single image
//! always gets a 1×1 grid.

use crate::config::LayoutConfig;
use std::fmt;

/// How the column count is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutStrategy {
    /// Match the frame's width/height ratio.
    FrameAspect(f64),
    /// No frame: use a fixed target ratio.
    Fallback(f64),
    /// Fixed-width canvas with at most this many columns.
    FixedWidth(usize),
}

impl LayoutStrategy {
    /// Strategy for a run: `max_columns` wins, then the frame's aspect ratio
    /// if a frame was loaded, then the fallback ratio.
    pub fn choose(config: &LayoutConfig, frame_dimensions: Option<(u32, u32)>) -> Self {
        if let Some(max) = config.max_columns {
            return LayoutStrategy::FixedWidth(max);
        }
        match frame_dimensions {
            Some((w, h)) if w > 0 && h > 0 => LayoutStrategy::FrameAspect(w as f64 / h as f64),
            _ => LayoutStrategy::Fallback(config.fallback_aspect),
        }
    }

    pub fn is_fixed_width(&self) -> bool {
        matches!(self, LayoutStrategy::FixedWidth(_))
    }
}

impl fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutStrategy::FrameAspect(r) => write!(f, "frame aspect ratio {r:.2}"),
            LayoutStrategy::Fallback(r) => write!(f, "default aspect ratio {r:.2}"),
            LayoutStrategy::FixedWidth(m) => write!(f, "fixed width, at most {m} columns"),
        }
    }
}

/// Grid shape for a set of images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollageLayout {
    pub images: usize,
    pub columns: usize,
    pub rows: usize,
    pub strategy: LayoutStrategy,
}

impl CollageLayout {
    /// Plan the grid for `images` images. `None` when there are none.
    ///
    /// Columns never outnumber images. The rounded formula alone would give
    /// one image 2 columns from ratio 2.25 on, and two images 3 columns from
    /// ratio 3.125 on; those grids get one row of `images` columns instead.
    pub fn plan(images: usize, strategy: LayoutStrategy) -> Option<Self> {
        if images == 0 {
            return None;
        }
        let n = images as f64;
        let raw = match strategy {
            LayoutStrategy::FrameAspect(ratio) => (n * ratio).sqrt().round_ties_even(),
            LayoutStrategy::Fallback(ratio) => (n * ratio).sqrt().ceil(),
            LayoutStrategy::FixedWidth(max) => max as f64,
        };
        let columns = if raw.is_finite() && raw >= 1.0 {
            (raw as usize).min(images)
        } else {
            1
        };
        let rows = images.div_ceil(columns);

        Some(Self {
            images,
            columns,
            rows,
            strategy,
        })
    }

    /// (column, row) of the `index`-th image.
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index % self.columns, index / self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(n: usize, strategy: LayoutStrategy) -> (usize, usize) {
        let layout = CollageLayout::plan(n, strategy).unwrap();
        (layout.rows, layout.columns)
    }

    // =========================================================================
    // Column formulas
    // =========================================================================

    #[test]
    fn fallback_uses_ceil() {
        // sqrt(2 * 1.5) = 1.73 -> 2 columns
        assert_eq!(plan(2, LayoutStrategy::Fallback(1.5)), (1, 2));
        // sqrt(10 * 1.5) = 3.87 -> 4 columns, 3 rows
        assert_eq!(plan(10, LayoutStrategy::Fallback(1.5)), (3, 4));
        // sqrt(24 * 1.5) = 6 exactly
        assert_eq!(plan(24, LayoutStrategy::Fallback(1.5)), (4, 6));
    }

    #[test]
    fn frame_aspect_rounds() {
        // sqrt(10 * 0.75) = 2.74 -> 3 columns
        assert_eq!(plan(10, LayoutStrategy::FrameAspect(0.75)), (4, 3));
        // sqrt(12 * 1.2) = 3.79 -> 4 columns
        assert_eq!(plan(12, LayoutStrategy::FrameAspect(1.2)), (3, 4));
    }

    #[test]
    fn wide_frame_never_leaves_empty_columns() {
        // round(sqrt(1 * 2.25)) = round(1.5) = 2, clamped to the single image
        assert_eq!(plan(1, LayoutStrategy::FrameAspect(2.25)), (1, 1));
        // round(sqrt(2 * 4)) = 3, clamped to the 2 images
        assert_eq!(plan(2, LayoutStrategy::FrameAspect(4.0)), (1, 2));
        // round(sqrt(2 * 2.25)) = round(2.12) = 2, no clamp needed
        assert_eq!(plan(2, LayoutStrategy::FrameAspect(2.25)), (1, 2));
        // round(sqrt(3 * 4)) = round(3.46) = 3
        assert_eq!(plan(3, LayoutStrategy::FrameAspect(4.0)), (1, 3));
        assert_eq!(plan(4, LayoutStrategy::FrameAspect(16.0)), (1, 4));
    }

    #[test]
    fn frame_aspect_rounds_ties_to_even() {
        // sqrt(25 * 0.25) = 2.5 -> 2
        assert_eq!(plan(25, LayoutStrategy::FrameAspect(0.25)).1, 2);
    }

    #[test]
    fn fixed_width_caps_columns() {
        assert_eq!(plan(30, LayoutStrategy::FixedWidth(14)), (3, 14));
        assert_eq!(plan(5, LayoutStrategy::FixedWidth(14)), (1, 5));
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    #[test]
    fn single_image_is_one_by_one() {
        for strategy in [
            LayoutStrategy::FrameAspect(4.0),
            LayoutStrategy::FrameAspect(0.1),
            LayoutStrategy::Fallback(1.5),
            LayoutStrategy::FixedWidth(14),
        ] {
            assert_eq!(plan(1, strategy), (1, 1), "{strategy}");
        }
    }

    #[test]
    fn grid_always_holds_every_image() {
        for n in 1..=60 {
            for strategy in [
                LayoutStrategy::FrameAspect(0.7),
                LayoutStrategy::FrameAspect(1.4),
                LayoutStrategy::Fallback(1.5),
                LayoutStrategy::FixedWidth(14),
            ] {
                let layout = CollageLayout::plan(n, strategy).unwrap();
                assert!(layout.columns >= 1 && layout.rows >= 1);
                assert!(layout.columns <= n);
                assert!(layout.rows * layout.columns >= n, "n={n} {strategy}");
                // no entirely empty trailing row
                assert!((layout.rows - 1) * layout.columns < n);
            }
        }
    }

    #[test]
    fn degenerate_ratio_still_gives_one_column() {
        assert_eq!(plan(3, LayoutStrategy::FrameAspect(0.0)), (3, 1));
        assert_eq!(plan(3, LayoutStrategy::Fallback(f64::NAN)), (3, 1));
    }

    #[test]
    fn no_images_no_layout() {
        assert!(CollageLayout::plan(0, LayoutStrategy::Fallback(1.5)).is_none());
    }

    #[test]
    fn cells_are_row_major() {
        let layout = CollageLayout::plan(5, LayoutStrategy::FixedWidth(2)).unwrap();
        assert_eq!(layout.cell(0), (0, 0));
        assert_eq!(layout.cell(1), (1, 0));
        assert_eq!(layout.cell(2), (0, 1));
        assert_eq!(layout.cell(4), (0, 2));
    }

    // =========================================================================
    // Strategy choice
    // =========================================================================

    #[test]
    fn choose_prefers_max_columns() {
        let config = LayoutConfig {
            max_columns: Some(14),
            ..LayoutConfig::default()
        };
        assert_eq!(
            LayoutStrategy::choose(&config, Some((1000, 800))),
            LayoutStrategy::FixedWidth(14)
        );
    }

    #[test]
    fn choose_uses_frame_when_loaded() {
        assert_eq!(
            LayoutStrategy::choose(&LayoutConfig::default(), Some((1200, 1600))),
            LayoutStrategy::FrameAspect(0.75)
        );
    }

    #[test]
    fn choose_falls_back_without_frame() {
        assert_eq!(
            LayoutStrategy::choose(&LayoutConfig::default(), None),
            LayoutStrategy::Fallback(1.5)
        );
    }
}
