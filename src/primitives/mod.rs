// src/primitives/mod.rs

//! Stateless 2D drawing algorithms over a `PixelBuffer`.
//!
//! Every primitive clips against the buffer bounds. Geometry that lands
//! partially or wholly off-screen is drawn partially or not at all; it is never
//! an error. The only failure is a malformed source buffer passed to `blit`.


use crate::color::Color;
use crate::config::PixelFormat;
use crate::error::{DisplayError, Result};
use crate::geometry::Rect;
use crate::pixel_buffer::{codec, PixelBuffer};

pub use crate::geometry::{rect_contains, rect_intersect};

/// Bytes per pixel of `blit` source data, which is always RGBA8888.
const SOURCE_BPP: usize = 4;

/// Writes `color` to every pixel.
pub fn clear(buf: &mut PixelBuffer, color: Color) {
    let pixel = buf.encode(color);
    let width = buf.width();
    for y in 0..buf.height() {
        buf.fill_span(y, 0, width, pixel);
    }
}

#[inline]
pub fn set_pixel(buf: &mut PixelBuffer, x: u32, y: u32, color: Color) {
    buf.set_pixel(x, y, color);
}

/// Fills `rect` after clipping it to the buffer. An empty clip is a no-op.
pub fn fill_rect(buf: &mut PixelBuffer, rect: &Rect, color: Color) {
    let Some(clipped) = rect.intersect(&buf.bounds()) else {
        return;
    };
    let pixel = buf.encode(color);
    for y in clipped.y..clipped.y + clipped.height {
        buf.fill_span(y, clipped.x, clipped.x + clipped.width, pixel);
    }
}

/// Draws a line with Bresenham's algorithm, both endpoints inclusive.
///
/// The line is stepped one pixel at a time along its major axis. Step `k` puts
/// the minor axis at `round(k * minor / major)`, ties rounding toward the
/// end point. Before stepping, the range of `k` is clipped to the steps that land
/// inside the buffer, and the error term is advanced to the first of them, so
/// an off-screen endpoint costs a binary search rather than a walk.
pub fn draw_line(buf: &mut PixelBuffer, x0: u32, y0: u32, x1: u32, y1: u32, color: Color) {
    let pixel = buf.encode(color);
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let (sx, sy) = ((x1 - x0).signum(), (y1 - y0).signum());
    let (adx, ady) = ((x1 - x0).abs(), (y1 - y0).abs());
    let x_major = adx >= ady;
    let (major, minor) = if x_major { (adx, ady) } else { (ady, adx) };

    let point = |k: i64, offset: i64| {
        if x_major {
            (x0 + sx * k, y0 + sy * offset)
        } else {
            (x0 + sx * offset, y0 + sy * k)
        }
    };
    let at = |k: i64| point(k, minor_offset(k, major, minor));

    let (width, height) = (buf.width() as i64, buf.height() as i64);
    let (x_lo, x_hi) = visible_steps(major, width, sx, |k| at(k).0);
    let (y_lo, y_hi) = visible_steps(major, height, sy, |k| at(k).1);
    let (first, end) = (x_lo.max(y_lo), x_hi.min(y_hi));
    if first >= end {
        return;
    }

    // Error term of step `first`, in units of 1 / (2 * major).
    let two_major = 2 * major;
    let mut offset = minor_offset(first, major, minor);
    let mut err = if major == 0 {
        0
    } else {
        ((2 * first as i128 * minor as i128 + major as i128) % two_major as i128) as i64
    };
    for k in first..end {
        let (x, y) = point(k, offset);
        buf.put_encoded(x as u32, y as u32, pixel);
        err += 2 * minor;
        if err >= two_major {
            err -= two_major;
            offset += 1;
        }
    }
}

/// Minor-axis offset of step `k`: `k * minor / major` rounded half up.
fn minor_offset(k: i64, major: i64, minor: i64) -> i64 {
    if major == 0 {
        return 0;
    }
    ((2 * k as i128 * minor as i128 + major as i128) / (2 * major as i128)) as i64
}

/// Half-open range of steps in `0..=steps` whose coordinate lies in `0..size`.
///
/// `coord` must be monotonic in the direction of `dir`.
fn visible_steps(steps: i64, size: i64, dir: i64, coord: impl Fn(i64) -> i64) -> (i64, i64) {
    if dir >= 0 {
        (0, first_false(steps, |k| coord(k) < size))
    } else {
        (
            first_false(steps, |k| coord(k) >= size),
            first_false(steps, |k| coord(k) >= 0),
        )
    }
}

/// First `k` in `0..=steps` where `pred` fails, `steps + 1` if it never does.
/// `pred` must hold on a prefix and fail on the rest.
fn first_false(steps: i64, pred: impl Fn(i64) -> bool) -> i64 {
    let (mut lo, mut hi) = (0, steps + 1);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Copies a `width` x `height` block of RGBA8888 `data` with row stride `pitch`
/// into the buffer at `(x, y)`.
///
/// Destination rows and columns outside the buffer are clipped. Source pixels are
/// converted when the buffer uses another format.
pub fn blit(
    buf: &mut PixelBuffer,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    data: &[u8],
    pitch: u32,
) -> Result<()> {
    if width == 0 || height == 0 {
        return Ok(());
    }
    let row_bytes = width as usize * SOURCE_BPP;
    if (pitch as usize) < row_bytes {
        return Err(DisplayError::InvalidParameter(format!(
            "source pitch {} is smaller than a {}px RGBA row",
            pitch, width
        )));
    }
    let required = (height as usize - 1) * pitch as usize + row_bytes;
    if data.len() < required {
        return Err(DisplayError::InvalidParameter(format!(
            "source holds {} bytes, {} needed for {}x{} at pitch {}",
            data.len(),
            required,
            width,
            height,
            pitch
        )));
    }

    let Some(clipped) = Rect::new(x, y, width, height).intersect(&buf.bounds()) else {
        return Ok(());
    };
    // Clipping only ever trims the right and bottom edges, since x and y are unsigned.
    let format = buf.format();
    let span = clipped.width as usize;

    for row in 0..clipped.height {
        let src_start = row as usize * pitch as usize;
        let src = &data[src_start..src_start + span * SOURCE_BPP];
        let Some(dst_start) = buf.offset(clipped.x, clipped.y + row) else {
            continue;
        };
        let dst_len = span * buf.bytes_per_pixel();
        let dst = &mut buf.as_bytes_mut()[dst_start..dst_start + dst_len];

        if format == PixelFormat::Rgba8888 {
            dst.copy_from_slice(src);
        } else {
            let bpp = format.bytes_per_pixel() as usize;
            for (s, d) in src.chunks_exact(SOURCE_BPP).zip(dst.chunks_exact_mut(bpp)) {
                let color = Color::from_rgba(s[0], s[1], s[2], s[3]);
                d.copy_from_slice(codec::encode(format, color).as_bytes());
            }
        }
    }
    Ok(())
}
