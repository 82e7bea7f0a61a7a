//! Image processing — pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory`, `ImageReader` with format sniffing |
//! | **Thumbnail** | `DynamicImage::resize_exact` with Lanczos3 |
//! | **Border** | `imageops::replace` onto a solid canvas |
//! | **Caption** | `usvg` text layout + `resvg` rasterizing |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Colors and borders parsed from configuration
//! - **Operations**: Decode, thumbnail, border, resize, save
//! - **Caption**: Text rasterized into a transparent strip

mod calculations;
pub mod caption;
pub mod operations;
mod params;

pub use calculations::{bounded_dimensions, centered_offset, fit_within, frame_fit};
pub use caption::{CaptionStyle, render_caption};
pub use operations::{
    ImagingError, add_border, decode_bytes, normalize, open_image, resize, save_png, thumbnail,
};
pub use params::{Border, Color};
