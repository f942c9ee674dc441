//! Scalar animation state driven by detector events.
//!
//! Everything here advances by a fixed timestep per frame regardless of how
//! long the host actually took to present the previous frame.

use crate::audio::FrameEvents;

/// Fixed timestep (seconds)
pub const DT: f32 = 1.0 / 60.0;
/// Frames a clap-flatten transition lasts
pub const FLATTEN_FRAMES: u32 = 12;
/// Beat scale right after a beat
pub const BEAT_PULSE: f32 = 1.18;
/// Fraction of the distance back to 1.0 recovered per frame
pub const BEAT_DECAY: f32 = 0.15;

/// Elapsed time as a frame count times a fixed step
#[derive(Clone, Debug)]
pub struct Clock {
    frame: u64,
    dt: f32,
}

impl Clock {
    pub fn new(dt: f32) -> Self {
        Self { frame: 0, dt }
    }

    pub fn advance(&mut self) {
        self.frame += 1;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Seconds since the visualizer was created
    pub fn elapsed(&self) -> f32 {
        (self.frame as f64 * self.dt as f64) as f32
    }
}

/// Clap transition: the waveform eases out to flat, then back in
#[derive(Clone, Debug, Default)]
pub struct Flatten {
    remaining: u32,
    total: u32,
}

impl Flatten {
    pub fn trigger(&mut self) {
        self.remaining = FLATTEN_FRAMES;
        self.total = FLATTEN_FRAMES;
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Waveform amplitude multiplier: 1 -> 0 over the first half, 0 -> 1 over
    /// the second, 1 when idle
    pub fn factor(&self) -> f32 {
        if self.remaining == 0 || self.total == 0 {
            return 1.0;
        }
        let fraction = self.remaining as f32 / self.total as f32;
        let gain = if fraction >= 0.5 {
            (fraction - 0.5) * 2.0
        } else {
            1.0 - fraction * 2.0
        };
        gain.clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
pub struct AnimationState {
    pub clock: Clock,
    /// Multiplies the central circle's radius
    pub beat_scale: f32,
    pub flatten: Flatten,
    /// Blob radius multiplier, only above 1.0 on a bass-drop frame
    pub drop_scale: f32,
}

impl AnimationState {
    pub fn new(dt: f32) -> Self {
        Self {
            clock: Clock::new(dt),
            beat_scale: 1.0,
            flatten: Flatten::default(),
            drop_scale: 1.0,
        }
    }

    /// Apply one frame of detector output to the scalar state
    pub fn apply(&mut self, events: &FrameEvents) {
        if events.clap {
            self.flatten.trigger();
        } else {
            self.flatten.tick();
        }

        if events.beat {
            self.beat_scale = BEAT_PULSE;
        } else {
            self.beat_scale += (1.0 - self.beat_scale) * BEAT_DECAY;
        }

        self.drop_scale = if events.bass_drop {
            1.25 + events.bass_energy.clamp(0.0, 0.5)
        } else {
            1.0
        };
    }

    pub fn waveform_gain(&self) -> f32 {
        self.flatten.factor()
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(DT)
    }
}
