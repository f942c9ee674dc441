//! Short-lived particles spawned by detector events.
//!
//! Motion is expressed in pixels per 60 Hz frame and scaled by `dt * 60`, so
//! the field behaves the same for any fixed timestep.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::color::blend;
use crate::draw::{Blend, Rgba, Surface};

/// Trail capacity for orbiting particles
pub const ORBIT_TRAIL: usize = 18;
/// Trail capacity for comets
pub const COMET_TRAIL: usize = 22;

/// Remaining life at or below this counts as dead. Repeatedly subtracting
/// `dt` leaves a few ulps behind, so a 1.0 s particle would otherwise live a
/// 61st frame.
pub const LIFE_EPSILON: f32 = 1e-4;

/// Discriminant of [`Particle`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Normal,
    Starburst,
    Orbit,
    Comet,
}

/// Linearly moving particle
#[derive(Clone, Debug)]
pub struct Mote {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left
    pub life: f32,
    pub color: Rgba,
    pub size: f32,
}

impl Mote {
    fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt * 60.0;
        self.life -= dt;
    }

    fn alpha(&self) -> f32 {
        (180.0 * self.life).clamp(0.0, 255.0) / 255.0
    }
}

/// Bounded history of recent positions, oldest first
#[derive(Clone, Debug)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: Vec2) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fading line of discs, small and faint at the tail
    fn draw(&self, surface: &mut dyn Surface, size: f32, color: Rgba, alpha: f32) {
        let n = self.points.len() as f32;
        for (i, &p) in self.points.iter().enumerate() {
            let k = (i as f32 + 1.0) / n;
            surface.circle(p, (size * 0.8 * k).max(0.5), color.with_alpha(alpha * 0.6 * k));
        }
    }
}

/// Particle circling the screen center
#[derive(Clone, Debug)]
pub struct Orbiter {
    pub angle: f32,
    pub base_radius: f32,
    /// Radians per second before jitter
    pub speed: f32,
    pub wobble_phase: f32,
    pub wobble_amp: f32,
    pub life: f32,
    pub color: Rgba,
    pub size: f32,
    pub pos: Vec2,
    pub trail: Trail,
}

/// Linearly moving particle dragging a trail
#[derive(Clone, Debug)]
pub struct Comet {
    pub mote: Mote,
    pub trail: Trail,
}

#[derive(Clone, Debug)]
pub enum Particle {
    Normal(Mote),
    Starburst(Mote),
    Orbit(Orbiter),
    Comet(Comet),
}

impl Particle {
    pub fn kind(&self) -> ParticleKind {
        match self {
            Particle::Normal(_) => ParticleKind::Normal,
            Particle::Starburst(_) => ParticleKind::Starburst,
            Particle::Orbit(_) => ParticleKind::Orbit,
            Particle::Comet(_) => ParticleKind::Comet,
        }
    }

    pub fn life(&self) -> f32 {
        match self {
            Particle::Normal(m) | Particle::Starburst(m) => m.life,
            Particle::Orbit(o) => o.life,
            Particle::Comet(c) => c.mote.life,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Particle::Normal(m) | Particle::Starburst(m) => m.pos,
            Particle::Orbit(o) => o.pos,
            Particle::Comet(c) => c.mote.pos,
        }
    }

    pub fn trail_len(&self) -> usize {
        match self {
            Particle::Orbit(o) => o.trail.len(),
            Particle::Comet(c) => c.trail.len(),
            _ => 0,
        }
    }

    /// Advance one timestep, returns whether the particle is still alive.
    ///
    /// A particle dies once its remaining life is `<= 0`, measured with a
    /// tolerance of [`LIFE_EPSILON`] seconds: anything left below that after
    /// this step counts as zero.
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f32, center: Vec2, rng: &mut R) -> bool {
        match self {
            Particle::Normal(m) | Particle::Starburst(m) => m.integrate(dt),
            Particle::Orbit(o) => {
                o.angle += o.speed * dt * (0.7 + 1.2 * rng.random::<f32>());
                o.wobble_phase += dt * 4.0;
                let radius = o.base_radius + o.wobble_phase.sin() * o.wobble_amp;
                o.pos = center + Vec2::new(o.angle.cos(), o.angle.sin()) * radius;
                o.trail.push(o.pos);
                o.life -= dt;
            }
            Particle::Comet(c) => {
                c.trail.push(c.mote.pos);
                c.mote.integrate(dt);
            }
        }
        self.life() > LIFE_EPSILON
    }

    /// Additive halo, drawn before the solid pass
    fn draw_glow(&self, surface: &mut dyn Surface) {
        match self {
            Particle::Normal(m) | Particle::Comet(Comet { mote: m, .. }) => {
                surface.circle(m.pos, m.size * 2.5, m.color.with_alpha(m.alpha() * 0.3));
            }
            Particle::Starburst(m) => {
                surface.circle(m.pos, m.size * 3.0, m.color.with_alpha(m.alpha() * 0.25));
            }
            Particle::Orbit(o) => {
                let alpha = o.life.clamp(0.0, 1.0) * 0.25;
                surface.circle(o.pos, o.size * 3.0, o.color.with_alpha(alpha));
            }
        }
    }

    fn draw_solid(&self, surface: &mut dyn Surface) {
        match self {
            Particle::Normal(m) => {
                surface.circle(m.pos, m.size, m.color.with_alpha(m.alpha()));
                // Bright core
                let core = blend(m.color, Rgba::WHITE, 0.6);
                surface.circle(m.pos, m.size * 0.4, core.with_alpha(m.alpha()));
            }
            Particle::Starburst(m) => {
                let star = star_points(m.pos, m.size * 2.2, m.size * 0.7, m.life * 6.0);
                surface.polygon(&star, m.color.with_alpha(m.alpha()));
            }
            Particle::Orbit(o) => {
                let alpha = o.life.clamp(0.0, 1.0) * 0.85;
                o.trail.draw(surface, o.size, o.color, alpha);
                surface.circle(o.pos, o.size, o.color.with_alpha(alpha));
            }
            Particle::Comet(c) => {
                let m = &c.mote;
                c.trail.draw(surface, m.size, m.color, m.alpha());
                surface.circle(m.pos, m.size, blend(m.color, Rgba::WHITE, 0.4).with_alpha(m.alpha()));
            }
        }
    }
}

/// Points of a 7-spike star centered on `center`
pub fn star_points(center: Vec2, outer: f32, inner: f32, rotation: f32) -> Vec<Vec2> {
    const SPIKES: usize = 7;
    (0..SPIKES * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = rotation + i as f32 * TAU / (SPIKES * 2) as f32;
            center + Vec2::new(a.cos(), a.sin()) * r
        })
        .collect()
}

/// Unordered set of live particles
#[derive(Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn count(&self, kind: ParticleKind) -> usize {
        self.particles.iter().filter(|p| p.kind() == kind).count()
    }

    /// Integrate every particle and drop the dead ones (order not preserved)
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f32, center: Vec2, rng: &mut R) {
        let mut i = 0;
        while i < self.particles.len() {
            if self.particles[i].step(dt, center, rng) {
                i += 1;
            } else {
                self.particles.swap_remove(i);
            }
        }
    }

    /// Glow layer first (additive), then the solid bodies
    pub fn draw(&self, surface: &mut dyn Surface) {
        if self.particles.is_empty() {
            return;
        }
        surface.set_blend(Blend::Additive);
        for particle in &self.particles {
            particle.draw_glow(surface);
        }
        surface.set_blend(Blend::Normal);
        for particle in &self.particles {
            particle.draw_solid(surface);
        }
    }

    /// `count` normal particles bursting out of `origin`
    pub fn spawn_normals<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
        origin: Vec2,
        colors: (Rgba, Rgba),
    ) {
        for _ in 0..count {
            let dir = random_dir(rng);
            let mote = Mote {
                pos: origin + dir * rng.random_range(0.0..20.0),
                vel: dir * rng.random_range(2.0..7.0),
                life: rng.random_range(0.8..1.6),
                color: blend(colors.0, colors.1, rng.random::<f32>()),
                size: rng.random_range(2.0..5.0),
            };
            self.particles.push(Particle::Normal(mote));
        }
    }

    /// `count` fast, short-lived star particles
    pub fn spawn_starbursts<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
        origin: Vec2,
        colors: (Rgba, Rgba),
    ) {
        for _ in 0..count {
            let dir = random_dir(rng);
            let mote = Mote {
                pos: origin + dir * rng.random_range(10.0..40.0),
                vel: dir * rng.random_range(4.0..10.0),
                life: rng.random_range(0.5..1.0),
                color: blend(colors.0, colors.1, rng.random::<f32>()),
                size: rng.random_range(4.0..8.0),
            };
            self.particles.push(Particle::Starburst(mote));
        }
    }

    /// `count` particles circling `center` at a fraction of `reach`
    pub fn spawn_orbits<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
        center: Vec2,
        reach: f32,
        colors: (Rgba, Rgba),
    ) {
        for _ in 0..count {
            let angle = rng.random_range(0.0..TAU);
            let base_radius = reach * rng.random_range(0.35..0.7);
            let orbiter = Orbiter {
                angle,
                base_radius,
                speed: rng.random_range(1.5..3.0) * if rng.random::<bool>() { 1.0 } else { -1.0 },
                wobble_phase: rng.random_range(0.0..TAU),
                wobble_amp: reach * rng.random_range(0.02..0.08),
                life: rng.random_range(2.0..3.5),
                color: blend(colors.0, colors.1, rng.random::<f32>()),
                size: rng.random_range(3.0..6.0),
                pos: center + Vec2::new(angle.cos(), angle.sin()) * base_radius,
                trail: Trail::new(ORBIT_TRAIL),
            };
            self.particles.push(Particle::Orbit(orbiter));
        }
    }

    /// `count` fast trailing particles
    pub fn spawn_comets<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
        origin: Vec2,
        colors: (Rgba, Rgba),
    ) {
        for _ in 0..count {
            let dir = random_dir(rng);
            let comet = Comet {
                mote: Mote {
                    pos: origin,
                    vel: dir * rng.random_range(6.0..12.0),
                    life: rng.random_range(1.0..1.8),
                    color: blend(colors.0, colors.1, rng.random::<f32>()),
                    size: rng.random_range(3.0..6.0),
                },
                trail: Trail::new(COMET_TRAIL),
            };
            self.particles.push(Particle::Comet(comet));
        }
    }
}

fn random_dir<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let a = rng.random_range(0.0..TAU);
    Vec2::new(a.cos(), a.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::recording::{Call, RecordingSurface};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;
    const COLORS: (Rgba, Rgba) = (Rgba::rgb(1.0, 0.2, 0.1), Rgba::rgb(0.2, 0.4, 1.0));

    fn mote(life: f32) -> Mote {
        Mote {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, 0.0),
            life,
            color: Rgba::WHITE,
            size: 3.0,
        }
    }

    #[test]
    fn test_normal_particle_dies_after_sixty_steps() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = ParticleField::new();
        field.push(Particle::Normal(mote(1.0)));

        for _ in 0..59 {
            field.step(DT, Vec2::ZERO, &mut rng);
        }
        assert_eq!(field.len(), 1);

        field.step(DT, Vec2::ZERO, &mut rng);
        assert!(field.is_empty());
    }

    #[test]
    fn test_life_tolerance_only_absorbs_drift() {
        let mut rng = StdRng::seed_from_u64(7);

        // Life left after 60 steps sits just above the tolerance
        let mut p = Particle::Normal(mote(1.0 + 2.0 * LIFE_EPSILON));
        for _ in 0..60 {
            assert!(p.step(DT, Vec2::ZERO, &mut rng));
        }
        assert!(p.life() > 0.0);
        assert!(!p.step(DT, Vec2::ZERO, &mut rng));

        // Exactly 30 frames of life: gone on the 30th step
        let mut p = Particle::Comet(Comet {
            mote: mote(0.5),
            trail: Trail::new(COMET_TRAIL),
        });
        for _ in 0..29 {
            assert!(p.step(DT, Vec2::ZERO, &mut rng));
        }
        assert!(!p.step(DT, Vec2::ZERO, &mut rng));
    }

    #[test]
    fn test_linear_motion_scales_with_dt() {
        let mut m = mote(1.0);
        m.integrate(DT);
        assert!((m.pos.x - 1.0).abs() < 1e-5);
        m.integrate(DT * 2.0);
        assert!((m.pos.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_trails_are_capped() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::new();
        field.spawn_orbits(&mut rng, 4, Vec2::new(640.0, 360.0), 360.0, COLORS);
        field.spawn_comets(&mut rng, 4, Vec2::new(640.0, 360.0), COLORS);

        for _ in 0..50 {
            field.step(DT, Vec2::new(640.0, 360.0), &mut rng);
        }
        for p in field.iter() {
            match p.kind() {
                ParticleKind::Orbit => assert_eq!(p.trail_len(), ORBIT_TRAIL),
                ParticleKind::Comet => assert_eq!(p.trail_len(), COMET_TRAIL),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn test_orbiters_stay_near_their_ring() {
        let mut rng = StdRng::seed_from_u64(3);
        let center = Vec2::new(400.0, 300.0);
        let mut field = ParticleField::new();
        field.spawn_orbits(&mut rng, 10, center, 300.0, COLORS);

        for _ in 0..90 {
            field.step(DT, center, &mut rng);
            for p in field.iter() {
                let d = p.position().distance(center);
                // base 0.35..0.7 of reach, wobble up to 0.08 of reach
                assert!(d > 300.0 * 0.26 && d < 300.0 * 0.79, "distance {}", d);
            }
        }
    }

    #[test]
    fn test_spawn_counts_and_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut field = ParticleField::new();
        field.spawn_normals(&mut rng, 30, Vec2::ZERO, COLORS);
        field.spawn_starbursts(&mut rng, 20, Vec2::ZERO, COLORS);

        assert_eq!(field.count(ParticleKind::Normal), 30);
        assert_eq!(field.count(ParticleKind::Starburst), 20);
        assert!(field.iter().all(|p| p.life() > 0.0 && p.life() <= 1.6));
    }

    #[test]
    fn test_everything_dies_eventually() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut field = ParticleField::new();
        field.spawn_normals(&mut rng, 40, Vec2::ZERO, COLORS);
        field.spawn_orbits(&mut rng, 5, Vec2::ZERO, 200.0, COLORS);
        field.spawn_comets(&mut rng, 5, Vec2::ZERO, COLORS);

        // Longest lifetime is 3.5s
        for _ in 0..(3.5f32 / DT).ceil() as usize + 1 {
            field.step(DT, Vec2::ZERO, &mut rng);
        }
        assert!(field.is_empty());
    }

    #[test]
    fn test_glow_is_drawn_beneath_solid() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = ParticleField::new();
        field.spawn_normals(&mut rng, 3, Vec2::new(10.0, 10.0), COLORS);

        let mut surface = RecordingSurface::new(100.0, 100.0);
        field.draw(&mut surface);

        assert_eq!(surface.calls[0], Call::Blend(Blend::Additive));
        let normal_at = surface
            .calls
            .iter()
            .position(|c| *c == Call::Blend(Blend::Normal))
            .unwrap();
        // 3 glows, then 2 circles per particle
        assert_eq!(normal_at, 4);
        assert_eq!(surface.count(|c| *c == Call::Circle), 9);
        assert!(!surface.saw_non_finite);
    }

    #[test]
    fn test_star_has_seven_spikes() {
        let points = star_points(Vec2::ZERO, 10.0, 4.0, 0.0);
        assert_eq!(points.len(), 14);
        assert!((points[0].length() - 10.0).abs() < 1e-4);
        assert!((points[1].length() - 4.0).abs() < 1e-4);
    }
}
