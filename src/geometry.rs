// src/geometry.rs

//! Axis-aligned rectangles in pixel space.

use serde::{Deserialize, Serialize};

/// A rectangle anchored at its top-left corner. Width and height are in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covering a whole `width` x `height` buffer.
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge, widened so `x + width` cannot overflow.
    fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        rect_contains(self, x, y)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        match rect_intersect(self, other) {
            (true, r) => Some(r),
            (false, _) => None,
        }
    }
}

/// True iff `x` lies in `[rect.x, rect.x + rect.width)` and `y` in `[rect.y, rect.y + rect.height)`.
pub fn rect_contains(rect: &Rect, x: u32, y: u32) -> bool {
    x >= rect.x && (x as u64) < rect.right() && y >= rect.y && (y as u64) < rect.bottom()
}

/// Intersects two rectangles.
///
/// Returns `(false, Rect::default())` when they do not overlap. Rectangles that
/// only share an edge have an empty intersection.
pub fn rect_intersect(a: &Rect, b: &Rect) -> (bool, Rect) {
    let left = a.x.max(b.x);
    let top = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());

    if right <= left as u64 || bottom <= top as u64 {
        return (false, Rect::default());
    }
    (
        true,
        Rect::new(
            left,
            top,
            (right - left as u64) as u32,
            (bottom - top as u64) as u32,
        ),
    )
}
