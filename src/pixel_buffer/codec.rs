// src/pixel_buffer/codec.rs

//! Conversion between `Color` and the in-memory byte layout of each `PixelFormat`.

use crate::color::Color;
use crate::config::PixelFormat;

/// A color already converted to a format's byte layout.
///
/// Only the first `len` bytes are meaningful. Encoding once and copying the
/// bytes keeps span fills free of per-pixel conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedPixel {
    bytes: [u8; 4],
    len: usize,
}

impl EncodedPixel {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Rounds `value * max / 255` to the nearest integer, ties rounding up.
#[inline]
fn quantize(value: u8, max: u32) -> u16 {
    ((2 * value as u32 * max + 255) / 510) as u16
}

/// Inverse of `quantize`: rounds `q * 255 / max` to nearest, ties up.
#[inline]
fn expand(q: u16, max: u32) -> u8 {
    ((q as u32 * 510 + max) / (2 * max)) as u8
}

pub fn encode(format: PixelFormat, color: Color) -> EncodedPixel {
    match format {
        PixelFormat::Rgba8888 => EncodedPixel {
            bytes: [color.r, color.g, color.b, color.a],
            len: 4,
        },
        PixelFormat::Argb8888 => EncodedPixel {
            bytes: [color.a, color.r, color.g, color.b],
            len: 4,
        },
        PixelFormat::Rgb888 => EncodedPixel {
            bytes: [color.r, color.g, color.b, 0],
            len: 3,
        },
        PixelFormat::Rgb565 => {
            let packed = (quantize(color.r, 31) << 11)
                | (quantize(color.g, 63) << 5)
                | quantize(color.b, 31);
            let [lo, hi] = packed.to_le_bytes();
            EncodedPixel {
                bytes: [lo, hi, 0, 0],
                len: 2,
            }
        }
    }
}

/// Decodes one pixel. `bytes` must hold at least `format.bytes_per_pixel()` bytes.
/// Formats without an alpha channel decode as opaque.
pub fn decode(format: PixelFormat, bytes: &[u8]) -> Color {
    match format {
        PixelFormat::Rgba8888 => Color::from_rgba(bytes[0], bytes[1], bytes[2], bytes[3]),
        PixelFormat::Argb8888 => Color::from_rgba(bytes[1], bytes[2], bytes[3], bytes[0]),
        PixelFormat::Rgb888 => Color::from_rgb(bytes[0], bytes[1], bytes[2]),
        PixelFormat::Rgb565 => {
            let packed = u16::from_le_bytes([bytes[0], bytes[1]]);
            Color::from_rgb(
                expand(packed >> 11, 31),
                expand((packed >> 5) & 0x3F, 63),
                expand(packed & 0x1F, 31),
            )
        }
    }
}
