//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the configuration (strings and numbers from `config.toml`) and the
//! [`operations`](super::operations) module that does the pixel work.
//!
//! ## Types
//!
//! - [`Color`] — RGBA color parsed from `#rgb`, `#rrggbb` or `#rrggbbaa`.
//! - [`Border`] — Solid padding: width in pixels plus color.

use super::operations::ImagingError;
use image::Rgba;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse a hex color: `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse(text: &str) -> Result<Self, ImagingError> {
        let invalid = || ImagingError::InvalidColor(text.to_string());
        let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let nibble = |i: usize| byte(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Ok(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: byte(&hex[6..8])?,
            }),
            _ => Err(invalid()),
        }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    /// `#rrggbb` form, for SVG `fill` attributes.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Solid padding around an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub width: u32,
    pub color: Color,
}

impl Border {
    pub fn new(width: u32, color: Color) -> Self {
        Self { width, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_six_digit_hex() {
        assert_eq!(Color::parse("#d3d3d3").unwrap(), Color::rgb(0xd3, 0xd3, 0xd3));
        assert_eq!(Color::parse("#FFD700").unwrap(), Color::rgb(0xff, 0xd7, 0x00));
    }

    #[test]
    fn parse_short_hex() {
        assert_eq!(Color::parse("#fff").unwrap(), Color::rgb(255, 255, 255));
        assert_eq!(Color::parse("#000").unwrap(), Color::rgb(0, 0, 0));
    }

    #[test]
    fn parse_hex_with_alpha() {
        let c = Color::parse("#11223380").unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (0x11, 0x22, 0x33, 0x80));
    }

    #[test]
    fn parse_rejects_names_and_garbage() {
        for bad in ["gold", "#12", "#12345", "#gggggg", "123456", "#ééé"] {
            assert!(Color::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn hex_rgb_roundtrip() {
        assert_eq!(Color::rgb(0xff, 0xd7, 0x00).to_hex_rgb(), "#ffd700");
    }
}
