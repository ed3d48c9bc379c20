//! Drawing interface
//!
//! The core never owns a canvas. It issues fill/draw commands against a
//! [`Surface`] supplied by the platform and never reads pixels back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::Rect;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend toward `other`, `t` in [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// CSS colour string, e.g. `rgb(0,32,128)`
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Cell in the sprite sheet: row per archetype, column per frame variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteRef {
    pub row: u8,
    pub variant: u8,
}

impl SpriteRef {
    pub const fn new(row: u8, variant: u8) -> Self {
        Self { row, variant }
    }
}

/// How an actor is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Appearance {
    /// Sprite centred on the actor position
    Sprite(SpriteRef),
    /// Solid rectangle relative to the actor position
    Fill(Rect, Rgb),
    /// Headless tasks draw nothing
    Hidden,
}

/// Drawable target provided by the platform
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Rgb);
    fn draw_sprite(&mut self, sprite: SpriteRef, center: Vec2);
    fn draw_text(&mut self, text: &str, at: Vec2);
}

/// Resource handles resolved once at startup and passed to whoever needs them
#[derive(Debug, Clone)]
pub struct Resources {
    /// Size of one sprite-sheet cell; sprite colliders use these bounds
    pub sprite_size: Vec2,
    /// Inset of the score text from the field's top-left corner
    pub text_inset: Vec2,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            sprite_size: Vec2::new(16.0, 16.0),
            text_inset: Vec2::new(8.0, 8.0),
        }
    }
}

impl Resources {
    /// Collider matching the sprite bounds, centred on the actor
    pub fn sprite_bounds(&self) -> Rect {
        Rect::centered(Vec2::ZERO, self.sprite_size)
    }
}
