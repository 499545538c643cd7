// src/color.rs

//! RGBA color values, the named color table, and brightness scaling.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);
    pub const WHITE: Color = Color::from_rgb(255, 255, 255);
    pub const RED: Color = Color::from_rgb(255, 0, 0);
    pub const GREEN: Color = Color::from_rgb(0, 255, 0);
    pub const BLUE: Color = Color::from_rgb(0, 0, 255);
    pub const YELLOW: Color = Color::from_rgb(255, 255, 0);
    pub const MAGENTA: Color = Color::from_rgb(255, 0, 255);
    pub const CYAN: Color = Color::from_rgb(0, 255, 255);
    pub const GRAY: Color = Color::from_rgb(128, 128, 128);
    /// Transparent black. Also the value read back from out-of-bounds pixels.
    pub const TRANSPARENT: Color = Color::from_rgba(0, 0, 0, 0);

    /// Opaque color from RGB components.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` value. Bits above the low 24 are ignored.
    pub const fn from_hex(hex: u32) -> Self {
        Self::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Packs the RGB channels back into `0xRRGGBB`.
    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Applies a brightness factor to the color channels, leaving alpha untouched.
    ///
    /// `brightness` is clamped to `[0.0, 1.0]`; NaN is treated as full brightness.
    pub fn scaled(self, brightness: f32) -> Self {
        let factor = if brightness.is_nan() {
            1.0
        } else {
            brightness.clamp(0.0, 1.0)
        };
        let scale = |c: u8| (c as f32 * factor).round() as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }
}

/// The ten predefined colors, addressable by name (e.g. from configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    White,
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    Gray,
    Transparent,
}

impl NamedColor {
    pub const ALL: [NamedColor; 10] = [
        NamedColor::Black,
        NamedColor::White,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Blue,
        NamedColor::Yellow,
        NamedColor::Magenta,
        NamedColor::Cyan,
        NamedColor::Gray,
        NamedColor::Transparent,
    ];

    pub fn to_color(self) -> Color {
        match self {
            NamedColor::Black => Color::BLACK,
            NamedColor::White => Color::WHITE,
            NamedColor::Red => Color::RED,
            NamedColor::Green => Color::GREEN,
            NamedColor::Blue => Color::BLUE,
            NamedColor::Yellow => Color::YELLOW,
            NamedColor::Magenta => Color::MAGENTA,
            NamedColor::Cyan => Color::CYAN,
            NamedColor::Gray => Color::GRAY,
            NamedColor::Transparent => Color::TRANSPARENT,
        }
    }
}

impl From<NamedColor> for Color {
    fn from(named: NamedColor) -> Self {
        named.to_color()
    }
}
