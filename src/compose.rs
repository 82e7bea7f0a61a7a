//! Grid rendering.
//!
//! The collage is laid out in inches and rasterized at `layout.dpi`:
//!
//! - **Aspect modes**: every cell is `cell_size` inches square, so the canvas
//!   is `columns × cell_size` by `rows × cell_size`.
//! - **Fixed width**: the canvas is `fixed_width` inches wide and
//!   `rows × cell_size` tall; columns share the width evenly.
//!
//! Each image is scaled to fit inside its cell minus `gutter` on every side,
//! keeping its aspect ratio, and centered. Cells without an image keep the
//! background color. With `tight_crop` the canvas is cut down to the drawn
//! images plus `pad` inches of margin.
//!
//! Large searches would need gigabytes of canvas at full resolution, so a
//! grid over [`MAX_CANVAS_PIXELS`] is rendered at a proportionally lower dpi.

use crate::config::LayoutConfig;
use crate::imaging::{self, Color, ImagingError, fit_within};
use crate::layout::CollageLayout;
use image::{RgbaImage, imageops};

/// Largest canvas rendered at full resolution (256 MB of RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 64_000_000;

/// A pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Pixel geometry of a planned grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub canvas: (u32, u32),
    pub cell: (u32, u32),
    pub gutter: u32,
    pub pad: u32,
}

impl Geometry {
    /// Geometry at `layout.dpi`, or at a lower resolution when that canvas
    /// would exceed [`MAX_CANVAS_PIXELS`].
    pub fn new(layout: &CollageLayout, config: &LayoutConfig) -> Self {
        let full = Self::at_dpi(layout, config, config.dpi as f64, f64::round);
        let pixels = full.pixels();
        if pixels <= MAX_CANVAS_PIXELS {
            return full;
        }

        let dpi = config.dpi as f64 * (MAX_CANVAS_PIXELS as f64 / pixels as f64).sqrt();
        tracing::warn!(
            "{}x{} canvas is too large, rendering at {:.0} dpi instead of {}",
            full.canvas.0,
            full.canvas.1,
            dpi,
            config.dpi
        );
        Self::at_dpi(layout, config, dpi, f64::floor)
    }

    fn at_dpi(
        layout: &CollageLayout,
        config: &LayoutConfig,
        dpi: f64,
        to_px: fn(f64) -> f64,
    ) -> Self {
        let px = |inches: f64| to_px(inches * dpi) as u32;
        let cell_px = px(config.cell_size).max(1);
        let rows = layout.rows as u32;
        let columns = layout.columns as u32;

        let (canvas, cell) = if layout.strategy.is_fixed_width() {
            let width = px(config.fixed_width).max(columns);
            ((width, rows * cell_px), (width / columns, cell_px))
        } else {
            ((columns * cell_px, rows * cell_px), (cell_px, cell_px))
        };

        Self {
            canvas,
            cell,
            // a cell is never squeezed below one pixel
            gutter: px(config.gutter).min(cell.0.min(cell.1).saturating_sub(1) / 2),
            pad: px(config.pad),
        }
    }

    pub fn pixels(&self) -> u64 {
        self.canvas.0 as u64 * self.canvas.1 as u64
    }

    /// Where an image of `size` lands in cell (`column`, `row`).
    pub fn place(&self, column: usize, row: usize, size: (u32, u32)) -> Rect {
        let (cell_w, cell_h) = self.cell;
        let inner = (cell_w - 2 * self.gutter, cell_h - 2 * self.gutter);
        let (width, height) = fit_within(size, inner);
        Rect {
            x: column as u32 * cell_w + (cell_w - width) / 2,
            y: row as u32 * cell_h + (cell_h - height) / 2,
            width,
            height,
        }
    }

    /// `content` grown by the pad, clamped to the canvas.
    pub fn padded(&self, content: Rect) -> Rect {
        let x = content.x.saturating_sub(self.pad);
        let y = content.y.saturating_sub(self.pad);
        let right = (content.right() + self.pad).min(self.canvas.0);
        let bottom = (content.bottom() + self.pad).min(self.canvas.1);
        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

/// Draw `images` into the grid and return the finished raster.
///
/// `images` beyond `layout.images` are ignored.
pub fn render_collage(
    images: &[RgbaImage],
    layout: &CollageLayout,
    config: &LayoutConfig,
) -> Result<RgbaImage, ImagingError> {
    let background = Color::parse(&config.background)?;
    let geometry = Geometry::new(layout, config);
    let (canvas_w, canvas_h) = geometry.canvas;
    tracing::debug!(
        "rendering {}x{} grid on a {}x{} canvas",
        layout.rows,
        layout.columns,
        canvas_w,
        canvas_h
    );

    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, background.to_rgba());
    let mut content: Option<Rect> = None;

    for (index, img) in images.iter().take(layout.images).enumerate() {
        let (column, row) = layout.cell(index);
        let rect = geometry.place(column, row, img.dimensions());
        let scaled = imaging::resize(img, rect.width, rect.height);
        imageops::overlay(&mut canvas, &scaled, rect.x as i64, rect.y as i64);
        content = Some(match content {
            Some(so_far) => so_far.union(&rect),
            None => rect,
        });
    }

    match content {
        Some(content) if config.tight_crop => {
            let crop = geometry.padded(content);
            Ok(imageops::crop_imm(&canvas, crop.x, crop.y, crop.width, crop.height).to_image())
        }
        _ => Ok(canvas),
    }
}
