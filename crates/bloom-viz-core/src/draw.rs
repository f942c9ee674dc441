//! Drawing surface abstraction.
//!
//! The visualizer never owns a render target: every painting method takes a
//! `&mut dyn Surface` so the host decides what a circle or polygon becomes
//! (nannou draw calls in the app, a call recorder in tests).
//!
//! Coordinates are in pixels with the origin at the top-left corner and y
//! growing downwards.

use glam::Vec2;

/// Color with straight (non-premultiplied) alpha, all channels 0.0-1.0
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);

    /// Same color with a new alpha (clamped)
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Multiply the color channels, leaving alpha untouched
    pub fn scaled(self, k: f32) -> Self {
        Self {
            r: (self.r * k).clamp(0.0, 1.0),
            g: (self.g * k).clamp(0.0, 1.0),
            b: (self.b * k).clamp(0.0, 1.0),
            a: self.a,
        }
    }
}

/// How subsequent primitives combine with what is already on the surface
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Blend {
    /// Regular alpha compositing
    #[default]
    Normal,
    /// Source color times alpha is added to the destination (glow layers)
    Additive,
}

/// Immediate-mode drawing target.
///
/// Implementations execute (or record) each call in order; later calls are
/// composited over earlier ones.
pub trait Surface {
    /// Drawable area in pixels (width, height)
    fn size(&self) -> (f32, f32);

    /// Blend mode for all following primitives
    fn set_blend(&mut self, blend: Blend);

    /// Filled axis-aligned rectangle, `origin` is the top-left corner
    fn rect(&mut self, origin: Vec2, size: Vec2, color: Rgba);

    /// Filled circle
    fn circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Stroked circle outline
    fn ring(&mut self, center: Vec2, radius: f32, weight: f32, color: Rgba);

    /// Filled polygon (implicitly closed)
    fn polygon(&mut self, points: &[Vec2], color: Rgba);

    /// Connected line segments
    fn polyline(&mut self, points: &[Vec2], weight: f32, color: Rgba);
}
