//! Serializable stroke and background colors.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// RGBA8 color stored on strokes, layers and the canvas background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl InkColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = byte(&hex[0..1])? * 17;
                let g = byte(&hex[1..2])? * 17;
                let b = byte(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// Scale alpha by `opacity` (clamped to [0, 1]).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        let a = (f64::from(self.a) * opacity).round() as u8;
        Self { a, ..self }
    }
}

impl Default for InkColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for InkColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<InkColor> for Color {
    fn from(color: InkColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(InkColor::from_hex("#fff"), Some(InkColor::white()));
        assert_eq!(InkColor::from_hex("000000"), Some(InkColor::black()));
        assert_eq!(
            InkColor::from_hex("#1e90ff80"),
            Some(InkColor::new(0x1e, 0x90, 0xff, 0x80))
        );
        assert_eq!(InkColor::from_hex("#12345"), None);
        assert_eq!(InkColor::from_hex("#gggggg"), None);
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(InkColor::new(255, 0, 16, 255).to_hex(), "#ff0010ff");
    }

    #[test]
    fn test_with_opacity() {
        let c = InkColor::black().with_opacity(0.5);
        assert_eq!(c.a, 128);
        assert_eq!(InkColor::black().with_opacity(3.0).a, 255);
        assert_eq!(InkColor::black().with_opacity(f64::NAN).a, 0);
    }

    #[test]
    fn test_peniko_conversion() {
        let c = InkColor::new(10, 20, 30, 40);
        let p: Color = c.into();
        assert_eq!(InkColor::from(p), c);
    }
}
