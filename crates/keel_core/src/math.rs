//! Integer rectangles and frame extents
//!
//! Re-exports glam for vector types used by callers

pub use glam::*;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Integer rectangle in window coordinates (origin bottom-left, GL style).
///
/// `repr(C)` so ranges of rectangles can be handed to drivers as flat `i32`
/// arrays (x, y, width, height per entry).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_origin_size(origin: IVec2, size: IVec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    pub fn origin(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    /// Exclusive upper corner.
    pub fn max(&self) -> IVec2 {
        self.origin() + self.size()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.origin().cmpge(self.origin()).all() && other.max().cmple(self.max()).all()
    }
}

/// Extent of a drawable surface (window or render target).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameBounds {
    pub width: i32,
    pub height: i32,
}

impl FrameBounds {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Rectangle covering the whole surface.
    pub const fn full_rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// True when `rect` covers exactly the whole surface.
    pub fn is_full(&self, rect: &Rect) -> bool {
        *rect == self.full_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_rect_matches_bounds() {
        let bounds = FrameBounds::new(640, 480);
        assert!(bounds.is_full(&Rect::new(0, 0, 640, 480)));
        assert!(!bounds.is_full(&Rect::new(0, 0, 320, 480)));
        assert!(!bounds.is_full(&Rect::new(1, 0, 640, 480)));
    }

    #[test]
    fn containment() {
        let outer = Rect::new(0, 0, 100, 100);
        assert!(outer.contains(&Rect::new(10, 10, 20, 20)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&Rect::new(90, 90, 20, 20)));
    }

    #[test]
    fn rects_flatten_to_ints() {
        let rects = [Rect::new(1, 2, 3, 4), Rect::new(5, 6, 7, 8)];
        let ints: &[i32] = bytemuck::cast_slice(&rects);
        assert_eq!(ints, &[1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
