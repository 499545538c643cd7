// src/pixel_buffer/mod.rs

//! Owned pixel storage with bounds-checked access.
//!
//! A `PixelBuffer` is `pitch * height` bytes laid out row by row. Rows may be
//! padded past `width * bytes_per_pixel`; padding bytes are never read as pixels.
//! Coordinates outside the buffer are tolerated everywhere: writes are dropped
//! and reads return `Color::TRANSPARENT`.

pub mod codec;


use crate::color::Color;
use crate::config::PixelFormat;
use crate::error::{DisplayError, Result};
use crate::geometry::Rect;
pub use codec::EncodedPixel;

pub struct PixelBuffer {
    width: u32,
    height: u32,
    pitch: u32,
    format: PixelFormat,
    data: Box<[u8]>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pitch", &self.pitch)
            .field("format", &self.format)
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .finish()
    }
}

/// Allocates a zeroed byte buffer, reporting allocation failure instead of aborting.
fn allocate_zeroed(bytes: usize) -> Result<Box<[u8]>> {
    let mut storage: Vec<u8> = Vec::new();
    storage
        .try_reserve_exact(bytes)
        .map_err(|_| DisplayError::OutOfMemory { bytes })?;
    storage.resize(bytes, 0);
    Ok(storage.into_boxed_slice())
}

impl PixelBuffer {
    /// Allocates a zeroed (transparent black) buffer with the tightest pitch.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let pitch = Self::min_pitch(width, format)?;
        Self::with_pitch(width, height, format, pitch)
    }

    /// Allocates a zeroed buffer with a caller-chosen row pitch, e.g. for alignment.
    pub fn with_pitch(width: u32, height: u32, format: PixelFormat, pitch: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidDimensions { width, height });
        }
        let min_pitch = Self::min_pitch(width, format)?;
        if pitch < min_pitch {
            return Err(DisplayError::InvalidParameter(format!(
                "pitch {} is below the minimum {} for {}px of {:?}",
                pitch, min_pitch, width, format
            )));
        }
        let bytes = (pitch as usize)
            .checked_mul(height as usize)
            .ok_or(DisplayError::OutOfMemory { bytes: usize::MAX })?;
        let data = allocate_zeroed(bytes)?;
        Ok(Self {
            width,
            height,
            pitch,
            format,
            data,
        })
    }

    /// Smallest valid pitch for a row of `width` pixels.
    pub fn min_pitch(width: u32, format: PixelFormat) -> Result<u32> {
        width.checked_mul(format.bytes_per_pixel()).ok_or_else(|| {
            DisplayError::InvalidParameter(format!(
                "a row of {}px of {:?} overflows a u32 pitch",
                width, format
            ))
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row, padding included.
    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel() as usize
    }

    /// The rectangle covering every pixel of the buffer.
    pub fn bounds(&self) -> Rect {
        Rect::full(self.width, self.height)
    }

    /// Size of the pixel storage in bytes.
    pub fn len_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of pixel `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.pitch as usize + x as usize * self.bytes_per_pixel())
    }

    /// The pixel bytes of row `y`, without trailing padding.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let start = self.offset(0, y)?;
        let len = self.width as usize * self.bytes_per_pixel();
        Some(&self.data[start..start + len])
    }

    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        let start = self.offset(0, y)?;
        let len = self.width as usize * self.bytes_per_pixel();
        Some(&mut self.data[start..start + len])
    }

    pub fn encode(&self, color: Color) -> EncodedPixel {
        codec::encode(self.format, color)
    }

    /// Reads a pixel. Out-of-bounds reads return transparent black.
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        match self.offset(x, y) {
            Some(off) => codec::decode(self.format, &self.data[off..off + self.bytes_per_pixel()]),
            None => Color::TRANSPARENT,
        }
    }

    /// Writes a pixel. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let pixel = self.encode(color);
        self.put_encoded(x, y, pixel);
    }

    #[inline]
    pub fn put_encoded(&mut self, x: u32, y: u32, pixel: EncodedPixel) {
        if let Some(off) = self.offset(x, y) {
            let bytes = pixel.as_bytes();
            self.data[off..off + bytes.len()].copy_from_slice(bytes);
        }
    }

    /// Fills pixels `x0..x1` of row `y`. The span is clipped to the buffer width.
    pub fn fill_span(&mut self, y: u32, x0: u32, x1: u32, pixel: EncodedPixel) {
        let x1 = x1.min(self.width);
        if x0 >= x1 || y >= self.height {
            return;
        }
        let bpp = self.bytes_per_pixel();
        let start = y as usize * self.pitch as usize + x0 as usize * bpp;
        let end = start + (x1 - x0) as usize * bpp;
        for dst in self.data[start..end].chunks_exact_mut(bpp) {
            dst.copy_from_slice(pixel.as_bytes());
        }
    }

    /// A new buffer of the given size holding the overlapping top-left region of this one.
    pub fn resized(&self, width: u32, height: u32) -> Result<PixelBuffer> {
        let mut out = PixelBuffer::new(width, height, self.format)?;
        let keep_bytes = width.min(self.width) as usize * self.bytes_per_pixel();
        for y in 0..height.min(self.height) {
            if let (Some(src), Some(dst)) = (self.row(y), out.row_mut(y)) {
                dst[..keep_bytes].copy_from_slice(&src[..keep_bytes]);
            }
        }
        Ok(out)
    }

    /// A copy of this buffer turned clockwise by `quarter_turns` * 90 degrees.
    ///
    /// Odd turn counts swap width and height. Pixels move as raw bytes, so no
    /// format conversion or quantization happens.
    pub fn rotated_clockwise(&self, quarter_turns: u32) -> Result<PixelBuffer> {
        let turns = quarter_turns % 4;
        let (w, h) = (self.width, self.height);
        let (out_w, out_h) = if turns % 2 == 1 { (h, w) } else { (w, h) };
        let mut out = PixelBuffer::new(out_w, out_h, self.format)?;
        let bpp = self.bytes_per_pixel();

        for dy in 0..out_h {
            for dx in 0..out_w {
                let (sx, sy) = match turns {
                    0 => (dx, dy),
                    1 => (dy, h - 1 - dx),
                    2 => (w - 1 - dx, h - 1 - dy),
                    _ => (w - 1 - dy, dx),
                };
                if let (Some(src), Some(dst)) = (self.offset(sx, sy), out.offset(dx, dy)) {
                    out.data[dst..dst + bpp].copy_from_slice(&self.data[src..src + bpp]);
                }
            }
        }
        Ok(out)
    }
}
