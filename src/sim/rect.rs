//! Axis-aligned rectangles for colliders, play-field frames and fences

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `size` centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&self, v: Vec2) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.width, self.height)
    }

    /// Grow (or shrink, when negative) on every side
    pub fn inflate(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + dx * 2.0,
            self.height + dy * 2.0,
        )
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.x <= p.x && p.x <= self.right() && self.y <= p.y && p.y <= self.bottom()
    }

    /// Limit movement `v` so `inner` does not leave this fence
    ///
    /// Each axis is clamped on its own, so a body pinned against one edge
    /// keeps sliding along the other axis. A body already outside is never
    /// pushed further out but is not pulled back in either.
    pub fn clamp_move(&self, inner: &Rect, v: Vec2) -> Vec2 {
        let lo_x = (self.x - inner.x).min(0.0);
        let hi_x = (self.right() - inner.right()).max(0.0);
        let lo_y = (self.y - inner.y).min(0.0);
        let hi_y = (self.bottom() - inner.bottom()).max(0.0);
        Vec2::new(v.x.clamp(lo_x, hi_x), v.y.clamp(lo_y, hi_y))
    }
}

/// Movement allowed for a body at `range` against every fence in turn
pub fn fenced_move(range: &Rect, v: Vec2, fences: &[Rect]) -> Vec2 {
    fences
        .iter()
        .fold(v, |v, fence| fence.clamp_move(range, v))
}
