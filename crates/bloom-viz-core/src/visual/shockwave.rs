//! Expanding rings spawned by bass drops.

use glam::Vec2;

use crate::draw::{Blend, Rgba, Surface};

/// Radius a new ring starts at
pub const START_RADIUS: f32 = 80.0;
/// Alpha (0-255 scale) below which a ring is dropped
pub const ALPHA_FLOOR: f32 = 8.0;

const START_ALPHA: f32 = 230.0;
const GROWTH_PER_FRAME: f32 = 18.0;
const ALPHA_DECAY: f32 = 0.93;
const WIDTH_DECAY: f32 = 0.97;
const MIN_WIDTH: f32 = 2.0;
const MAX_WIDTH: f32 = 40.0;

#[derive(Clone, Debug)]
pub struct Shockwave {
    pub radius: f32,
    pub max_radius: f32,
    /// 0-255
    pub alpha: f32,
    pub width: f32,
    pub color: Rgba,
}

impl Shockwave {
    /// Ring whose stroke is thicker the harder the bass hit
    pub fn new(bass_energy: f32, max_radius: f32, color: Rgba) -> Self {
        Self {
            radius: START_RADIUS,
            max_radius,
            alpha: START_ALPHA,
            width: (16.0 + 24.0 * bass_energy.max(0.0)).min(MAX_WIDTH),
            color,
        }
    }

    /// Advance one timestep, returns whether the ring is still visible
    pub fn step(&mut self, dt: f32) -> bool {
        self.radius += GROWTH_PER_FRAME * dt * 60.0;
        self.alpha *= ALPHA_DECAY;
        self.width = (self.width * WIDTH_DECAY).max(MIN_WIDTH);
        self.radius <= self.max_radius && self.alpha >= ALPHA_FLOOR
    }
}

#[derive(Default)]
pub struct ShockwaveField {
    waves: Vec<Shockwave>,
}

impl ShockwaveField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, wave: Shockwave) {
        self.waves.push(wave);
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shockwave> {
        self.waves.iter()
    }

    pub fn step(&mut self, dt: f32) {
        self.waves.retain_mut(|w| w.step(dt));
    }

    /// Soft additive halo under a crisp ring
    pub fn draw(&self, surface: &mut dyn Surface, center: Vec2) {
        if self.waves.is_empty() {
            return;
        }
        let alpha = |w: &Shockwave| w.alpha / 255.0;

        surface.set_blend(Blend::Additive);
        for w in &self.waves {
            surface.ring(center, w.radius, w.width * 2.2, w.color.with_alpha(alpha(w) * 0.35));
        }
        surface.set_blend(Blend::Normal);
        for w in &self.waves {
            surface.ring(center, w.radius, w.width, w.color.with_alpha(alpha(w)));
        }
    }
}
