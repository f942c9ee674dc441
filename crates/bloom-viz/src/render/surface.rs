//! `Surface` backed by a nannou `Draw`.
//!
//! The core paints in pixels with the origin top-left and y down; nannou's
//! window space is centered with y up, so every point goes through
//! [`to_world`].

use bloom_viz_core::{Blend, Rgba, Surface, Vec2 as ScreenPoint};
use nannou::color;
use nannou::prelude::*;

pub struct NannouSurface<'a> {
    base: &'a Draw,
    draw: Draw,
    blend: Blend,
    bounds: Rect,
}

impl<'a> NannouSurface<'a> {
    pub fn new(base: &'a Draw, bounds: Rect) -> Self {
        Self {
            base,
            draw: base.color_blend(BLEND_NORMAL),
            blend: Blend::Normal,
            bounds,
        }
    }

    fn point(&self, p: ScreenPoint) -> Vec2 {
        to_world(self.bounds, p)
    }

    fn paint(&self, c: Rgba) -> color::Rgba {
        paint_color(self.blend, c)
    }
}

/// Screen pixel (top-left origin, y down) to nannou window coordinates
pub fn to_world(bounds: Rect, p: ScreenPoint) -> Vec2 {
    vec2(bounds.left() + p.x, bounds.top() - p.y)
}

/// nannou's additive blend adds the source color as is, so straight alpha is
/// folded into the channels first
fn paint_color(blend: Blend, c: Rgba) -> color::Rgba {
    match blend {
        Blend::Normal => rgba(c.r, c.g, c.b, c.a),
        Blend::Additive => rgba(c.r * c.a, c.g * c.a, c.b * c.a, c.a),
    }
}

impl Surface for NannouSurface<'_> {
    fn size(&self) -> (f32, f32) {
        (self.bounds.w(), self.bounds.h())
    }

    fn set_blend(&mut self, blend: Blend) {
        if blend == self.blend {
            return;
        }
        self.blend = blend;
        self.draw = match blend {
            Blend::Normal => self.base.color_blend(BLEND_NORMAL),
            Blend::Additive => self.base.color_blend(BLEND_ADD),
        };
    }

    fn rect(&mut self, origin: ScreenPoint, size: ScreenPoint, color: Rgba) {
        let center = self.point(origin + size * 0.5);
        self.draw
            .rect()
            .xy(center)
            .w_h(size.x, size.y)
            .color(self.paint(color));
    }

    fn circle(&mut self, center: ScreenPoint, radius: f32, color: Rgba) {
        self.draw
            .ellipse()
            .xy(self.point(center))
            .radius(radius)
            .color(self.paint(color));
    }

    fn ring(&mut self, center: ScreenPoint, radius: f32, weight: f32, color: Rgba) {
        self.draw
            .ellipse()
            .xy(self.point(center))
            .radius(radius)
            .no_fill()
            .stroke(self.paint(color))
            .stroke_weight(weight);
    }

    fn polygon(&mut self, points: &[ScreenPoint], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let points: Vec<Vec2> = points.iter().map(|&p| self.point(p)).collect();
        self.draw.polygon().points(points).color(self.paint(color));
    }

    fn polyline(&mut self, points: &[ScreenPoint], weight: f32, color: Rgba) {
        if points.len() < 2 {
            return;
        }
        let points: Vec<Vec2> = points.iter().map(|&p| self.point(p)).collect();
        self.draw
            .polyline()
            .weight(weight)
            .points(points)
            .color(self.paint(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_map_to_window_space() {
        let bounds = Rect::from_w_h(800.0, 600.0);
        assert_eq!(to_world(bounds, ScreenPoint::new(0.0, 0.0)), vec2(-400.0, 300.0));
        assert_eq!(to_world(bounds, ScreenPoint::new(800.0, 600.0)), vec2(400.0, -300.0));
        assert_eq!(to_world(bounds, ScreenPoint::new(400.0, 300.0)), vec2(0.0, 0.0));
    }

    #[test]
    fn test_additive_colors_are_premultiplied() {
        let c = Rgba::rgba(1.0, 0.5, 0.0, 0.5);

        let normal = paint_color(Blend::Normal, c);
        assert_eq!((normal.red, normal.green, normal.alpha), (1.0, 0.5, 0.5));

        let additive = paint_color(Blend::Additive, c);
        assert_eq!((additive.red, additive.green, additive.blue), (0.5, 0.25, 0.0));
    }
}
