//! Pixel operations on decoded images.
//!
//! These functions combine the [calculations](super::calculations) with the
//! `image` crate. Everything ends up as `RgbaImage` so the compositing code
//! downstream never has to care about the source format.

use super::calculations::bounded_dimensions;
use super::params::Border;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid color: {0:?} (expected #rgb, #rrggbb or #rrggbbaa)")]
    InvalidColor(String),
    #[error("Caption rendering failed: {0}")]
    Caption(String),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Decode an in-memory image, guessing the format from its magic bytes.
pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Open and decode an image file.
///
/// The format is sniffed from the content rather than trusted from the
/// extension, since downloaded files are named after their URL.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Shrink so neither side exceeds `max_dimension` (Lanczos3, aspect preserved).
///
/// Images that already fit are returned untouched.
pub fn thumbnail(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (w, h) = bounded_dimensions((img.width(), img.height()), max_dimension);
    if (w, h) == (img.width(), img.height()) {
        return img;
    }
    img.resize_exact(w, h, FilterType::Lanczos3)
}

/// Pad with a solid border on all four sides.
///
/// Source pixels are copied as-is (no blending), so transparent areas stay
/// transparent inside the border.
pub fn add_border(img: &RgbaImage, border: Border) -> RgbaImage {
    if border.width == 0 {
        return img.clone();
    }
    let (w, h) = img.dimensions();
    let mut canvas = RgbaImage::from_pixel(
        w + border.width * 2,
        h + border.width * 2,
        border.color.to_rgba(),
    );
    imageops::replace(&mut canvas, img, border.width as i64, border.width as i64);
    canvas
}

/// Thumbnail then border: the form every image takes before layout.
pub fn normalize(img: DynamicImage, max_dimension: u32, border: Border) -> RgbaImage {
    let small = thumbnail(img, max_dimension).to_rgba8();
    add_border(&small, border)
}

/// Resize to exact dimensions with Lanczos3.
pub fn resize(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::Lanczos3)
}

/// Write as PNG regardless of the path's extension.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
