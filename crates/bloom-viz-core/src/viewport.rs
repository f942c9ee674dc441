//! Window bounds in surface pixels.

use glam::Vec2;

/// Drawable area, origin at the top-left corner
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub w: f32,
    pub h: f32,
}

impl Viewport {
    pub fn new(w: f32, h: f32) -> Self {
        Self {
            w: w.max(1.0),
            h: h.max(1.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.w * 0.5, self.h * 0.5)
    }

    /// Half of the shorter side; the reference length for radial layouts
    pub fn min_half(&self) -> f32 {
        self.w.min(self.h) * 0.5
    }

    /// Distance from the center to a corner
    pub fn half_diagonal(&self) -> f32 {
        (self.w * self.w + self.h * self.h).sqrt() * 0.5
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_follows_size() {
        let vp = Viewport::new(1280.0, 720.0);
        assert_eq!(vp.center(), Vec2::new(640.0, 360.0));
        assert_eq!(vp.min_half(), 360.0);
    }

    #[test]
    fn test_degenerate_size_is_clamped() {
        let vp = Viewport::new(0.0, -5.0);
        assert_eq!(vp.w, 1.0);
        assert_eq!(vp.h, 1.0);
    }
}
