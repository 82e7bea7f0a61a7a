//! Finishing steps applied to a rendered collage.
//!
//! ## Frame
//!
//! The collage is fitted inside the frame's interior (frame size minus
//! `margin`, aspect preserved, fractional pixels truncated), centered on a
//! `frame.background` canvas the size of the frame, and the frame is
//! alpha-composited on top so its transparent window shows the collage.
//! Finally the caption `<caption_prefix><query>` is drawn near the bottom-left
//! corner.
//!
//! ## Border
//!
//! A solid band of `output.border` pixels around the collage.

use crate::config::{FrameConfig, OutputConfig};
use crate::imaging::{
    self, Border, CaptionStyle, Color, ImagingError, centered_offset, frame_fit,
};
use image::{RgbaImage, imageops};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("frame image not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("frame is {width}x{height}, not larger than its {margin}px margin")]
    TooSmall { width: u32, height: u32, margin: u32 },
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

/// Load the frame artifact as RGBA.
pub fn load_frame(path: &Path) -> Result<RgbaImage, FrameError> {
    if !path.is_file() {
        return Err(FrameError::Missing(path.to_path_buf()));
    }
    Ok(imaging::open_image(path)?.to_rgba8())
}

pub fn caption_text(config: &FrameConfig, query: &str) -> String {
    format!("{}{}", config.caption_prefix, query.trim())
}

/// Composite `collage` into `frame` and caption it with `query`.
pub fn apply_frame(
    collage: &RgbaImage,
    frame: &RgbaImage,
    query: &str,
    config: &FrameConfig,
) -> Result<RgbaImage, FrameError> {
    let (frame_w, frame_h) = frame.dimensions();
    let (fit_w, fit_h) =
        frame_fit(collage.dimensions(), frame.dimensions(), config.margin).ok_or(
            FrameError::TooSmall {
                width: frame_w,
                height: frame_h,
                margin: config.margin,
            },
        )?;
    let background = Color::parse(&config.background)?;

    let resized = imaging::resize(collage, fit_w, fit_h);
    let mut canvas = RgbaImage::from_pixel(frame_w, frame_h, background.to_rgba());
    let (x, y) = centered_offset((frame_w, frame_h), (fit_w, fit_h));
    imageops::replace(&mut canvas, &resized, x, y);
    imageops::overlay(&mut canvas, frame, 0, 0);

    let text = caption_text(config, query);
    if text.trim().is_empty() {
        return Ok(canvas);
    }
    let style = CaptionStyle {
        size: config.caption_size as f32,
        color: Color::parse(&config.caption_color)?,
    };
    match imaging::render_caption(&text, style)? {
        Some(strip) => {
            let top = frame_h as i64 - config.caption_from_bottom;
            imageops::overlay(&mut canvas, &strip, config.caption_x, top);
        }
        None => tracing::warn!("no fonts available, frame caption left out"),
    }

    Ok(canvas)
}

/// Surround `collage` with the `[output]` border.
pub fn apply_border(collage: &RgbaImage, config: &OutputConfig) -> Result<RgbaImage, ImagingError> {
    let border = Border::new(config.border, Color::parse(&config.border_color)?);
    Ok(imaging::add_border(collage, border))
}
