use crate::util::ensure_positive_size;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Axis-aligned rectangle on the integer grid of a sheet.
/// `(x, y)` is the top-left corner, y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Unchecked constructor, callers guarantee `width > 0 && height > 0`.
    pub(crate) const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn try_new(x: i32, y: i32, width: i32, height: i32) -> Result<Self> {
        ensure_positive_size(width, height)?;
        Ok(Rect::new(x, y, width, height))
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Open-boundary overlap test: rectangles that only share an edge or a corner do not intersect.
    #[inline(always)]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Point lies strictly inside `self`, points on the boundary are not contained.
    #[inline(always)]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x > self.x && x < self.right() && y > self.y && y < self.bottom()
    }

    /// No part of `other` lies strictly outside `self`. A rectangle contains itself.
    #[inline(always)]
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    #[inline(always)]
    pub fn is_contained_in(&self, other: &Rect) -> bool {
        other.contains(self)
    }

    /// Returns `true` if `self` has the dimensions `width × height` in either orientation.
    pub fn matches_size(&self, width: i32, height: i32) -> bool {
        (self.width == width && self.height == height)
            || (self.width == height && self.height == width)
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[x: {}, y: {}, w: {}, h: {}]",
            self.x, self.y, self.width, self.height
        )
    }
}
