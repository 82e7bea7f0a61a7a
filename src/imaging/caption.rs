//! Caption rasterizing.
//!
//! Text is laid out by `usvg` from a one-line SVG `<text>` node, resolved
//! against the system font database, and rasterized by `resvg` into a
//! `tiny-skia` pixmap. The pixmap is premultiplied; it is demultiplied into a
//! straight-alpha `RgbaImage` so it can be alpha-composited with
//! `image::imageops::overlay`.

use super::operations::{ImagingError, Result};
use super::params::Color;
use image::{Rgba, RgbaImage};
use std::sync::Arc;

/// How a caption is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStyle {
    /// Font size in pixels.
    pub size: f32,
    pub color: Color,
}

/// Render `text` onto a transparent strip with its top-left corner at (0, 0).
///
/// Returns `Ok(None)` when no fonts are installed: the caption is decorative,
/// so a font-less machine produces a framed collage without it.
pub fn render_caption(text: &str, style: CaptionStyle) -> Result<Option<RgbaImage>> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if db.is_empty() {
        tracing::debug!("no system fonts found, caption skipped");
        return Ok(None);
    }
    render_caption_with_fonts(text, style, Arc::new(db))
}

fn render_caption_with_fonts(
    text: &str,
    style: CaptionStyle,
    fontdb: Arc<usvg::fontdb::Database>,
) -> Result<Option<RgbaImage>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let (width, height) = strip_size(text, style.size);
    let baseline = style.size.ceil();
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><text x="0" y="{baseline}" font-family="sans-serif" font-size="{size}" fill="{fill}" fill-opacity="{opacity}">{text}</text></svg>"#,
        size = style.size,
        fill = style.color.to_hex_rgb(),
        opacity = style.color.a as f32 / 255.0,
        text = escape_xml(text),
    );

    let opts = usvg::Options {
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| ImagingError::Caption(format!("parse caption svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ImagingError::Caption(format!("cannot allocate {width}x{height}")))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    let mut strip = RgbaImage::new(width, height);
    for (pixel, premultiplied) in strip.pixels_mut().zip(pixmap.pixels()) {
        let c = premultiplied.demultiply();
        *pixel = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(Some(strip))
}

/// Generous strip size for one line of text: wide glyphs average well under
/// the font size, and descenders fit in the extra half line.
fn strip_size(text: &str, size: f32) -> (u32, u32) {
    let chars = text.chars().count().max(1) as f32;
    let width = (chars * size * 0.75 + size).ceil() as u32;
    let height = (size * 1.5).ceil() as u32;
    (width.max(1), height.max(1))
}

fn escape_xml(text: &str) -> String {
    let single_line: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    quick_xml::escape::escape(single_line.as_str()).into_owned()
}
