//! Mapping of loudness and spectral balance to colors.
//!
//! `connotation_color` picks a mood color from the amplitude regime and the
//! bass/mid/treble balance; `palette_color` rotates that hue by a phase so
//! layers drawn in the same frame get related but distinct colors.

use crate::audio::detectors::{band_mean, bands};
use crate::draw::Rgba;

/// Number of hue steps the palette cursor cycles through
pub const PALETTE_SIZE: f32 = 8.0;
/// Hue rotation per palette step (in turns)
pub const PALETTE_STEP: f32 = 0.12;

const EPSILON: f32 = 1e-6;

// Hue targets in turns (0-1)
const BASS_HUE: f32 = 0.0; // red
const MID_HUE: f32 = 0.33; // green
const TREBLE_HUE: f32 = 0.6; // blue
const COMPLEX_HUE: f32 = 0.78; // purple

/// Hue (turns), saturation and value, each 0.0-1.0
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub fn new(h: f32, s: f32, v: f32) -> Self {
        Self {
            h: h.rem_euclid(1.0),
            s: s.clamp(0.0, 1.0),
            v: v.clamp(0.0, 1.0),
        }
    }

    pub fn to_rgba(self) -> Rgba {
        let (r, g, b) = hsv_to_rgb(self.h * 360.0, self.s, self.v);
        Rgba::rgb(r, g, b)
    }
}

/// HSV (hue in degrees) to RGB, all outputs 0.0-1.0
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> (f32, f32, f32) {
    let hue = hue.rem_euclid(360.0);
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r1, g1, b1) = if hue < 60.0 {
        (c, x, 0.0)
    } else if hue < 120.0 {
        (x, c, 0.0)
    } else if hue < 180.0 {
        (0.0, c, x)
    } else if hue < 240.0 {
        (0.0, x, c)
    } else if hue < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r1 + m, g1 + m, b1 + m)
}

/// Mood color for the current loudness and spectral balance
pub fn connotation_color(amp: f32, spectrum: &[f32]) -> Hsv {
    // Loud -> red/orange, quiet -> blue/purple, otherwise green
    let (mut h, mut s, mut v) = if amp > 0.7 {
        (0.03, 0.9, 1.0)
    } else if amp < 0.25 {
        (0.72, 0.7, 0.65)
    } else {
        (0.33, 0.8, 0.85)
    };

    if spectrum.is_empty() {
        return Hsv::new(h, s, v);
    }

    let bass = band_mean(spectrum, bands::BASS);
    let mid = band_mean(spectrum, bands::MID);
    let treble = band_mean(spectrum, bands::TREBLE);
    let total = bass + mid + treble + EPSILON;
    let (fb, fm, ft) = (bass / total, mid / total, treble / total);

    // Each band pulls the hue toward its own color; silence pulls nowhere
    let band_hue = fb * BASS_HUE + fm * MID_HUE + ft * TREBLE_HUE;
    let band_weight = 0.5 * (fb + fm + ft).min(1.0);
    h = lerp(h, band_hue, band_weight);
    s += 0.1 * fb;

    // Coefficient of variation: a spiky spectrum drifts purple and brighter
    let n = spectrum.len() as f32;
    let mean = spectrum.iter().sum::<f32>() / n;
    let variance = spectrum.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n;
    let complexity = (variance.sqrt() / (mean + EPSILON)).min(1.0);
    h = lerp(h, COMPLEX_HUE, 0.3 * complexity);
    v += 0.2 * complexity;

    Hsv::new(h, s, v)
}

/// Connotation color with its hue rotated by `PALETTE_STEP * (t mod PALETTE_SIZE)`
pub fn palette_color(t: f32, amp: f32, spectrum: &[f32]) -> Rgba {
    rotate_palette(connotation_color(amp, spectrum), t)
}

/// Palette rotation of an already computed connotation color. Painters that
/// draw many elements per frame compute the base once and rotate it here.
pub fn rotate_palette(base: Hsv, t: f32) -> Rgba {
    let step = if t.is_finite() {
        t.rem_euclid(PALETTE_SIZE)
    } else {
        0.0
    };
    Hsv::new(base.h + PALETTE_STEP * step, base.s, base.v).to_rgba()
}

/// Linear mix of two colors, `t` = 0 gives `a`
pub fn blend(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    Rgba::rgba(
        lerp(a.r, b.r, t),
        lerp(a.g, b.g, t),
        lerp(a.b, b.b, t),
        lerp(a.a, b.a, t),
    )
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
