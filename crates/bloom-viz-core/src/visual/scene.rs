//! Stateless layer painters.
//!
//! Each painter is a pure function of the frame's time, amplitude and
//! spectrum (plus a scale or gain owned by `AnimationState`), so it can be
//! called with any surface and produces the same calls for the same inputs.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::draw::{Blend, Rgba, Surface};
use crate::viewport::Viewport;
use crate::visual::color::{blend, rotate_palette, Hsv, PALETTE_SIZE};

/// Horizontal strips in the background gradient
pub const GRADIENT_BANDS: usize = 24;
/// Ripple rings travelling outward from the center
pub const RIPPLES: usize = 4;
/// Vertices of the morph blob outline
pub const BLOB_POINTS: usize = 96;
/// Upper bound on waveform polyline vertices
pub const WAVEFORM_POINTS: usize = 256;
/// Low-alpha passes under a glowing shape
pub const GLOW_PASSES: usize = 3;

const OVERLAY_RINGS: usize = 6;
const RIPPLE_SPEED: f32 = 90.0;
const SPECTRUM_SMOOTHING: usize = 2;

/// Inputs shared by every painter for one frame
#[derive(Clone, Copy, Debug)]
pub struct SceneFrame<'a> {
    pub viewport: Viewport,
    /// Seconds on the visualizer clock
    pub time: f32,
    pub amplitude: f32,
    pub spectrum: &'a [f32],
    /// Connotation color of this frame, rotated per layer
    pub mood: Hsv,
}

impl SceneFrame<'_> {
    fn color(&self, phase: f32) -> Rgba {
        rotate_palette(self.mood, phase)
    }
}

/// Gradient, ripples, the beat-pulsing circle and a radial light overlay
pub fn draw_background(surface: &mut dyn Surface, frame: &SceneFrame, beat_scale: f32) {
    let vp = frame.viewport;
    let t = frame.time;
    let center = vp.center();
    let reach = vp.half_diagonal();

    surface.set_blend(Blend::Normal);
    let top = frame.color(t * 0.25).scaled(0.35);
    let bottom = frame.color(t * 0.25 + 3.0).scaled(0.12);
    let band_h = vp.h / GRADIENT_BANDS as f32;
    for i in 0..GRADIENT_BANDS {
        let k = i as f32 / (GRADIENT_BANDS - 1) as f32;
        surface.rect(
            Vec2::new(0.0, i as f32 * band_h),
            Vec2::new(vp.w, band_h + 1.0),
            blend(top, bottom, k).with_alpha(1.0),
        );
    }

    surface.set_blend(Blend::Additive);
    let spacing = reach / RIPPLES as f32;
    for i in 0..RIPPLES {
        let radius = (t * RIPPLE_SPEED + i as f32 * spacing).rem_euclid(reach).max(1.0);
        let fade = 1.0 - radius / reach;
        let color = frame
            .color(t + i as f32)
            .with_alpha(0.18 * fade * (0.5 + frame.amplitude));
        surface.ring(center, radius, 2.0 + 4.0 * frame.amplitude, color);
    }

    let pulse = vp.min_half() * 0.22 * (1.0 + 0.5 * frame.amplitude) * beat_scale;
    let core = frame.color(t * 0.5 + 1.0);
    for pass in (1..=GLOW_PASSES).rev() {
        let k = pass as f32;
        surface.circle(center, pulse * (1.0 + 0.25 * k), core.with_alpha(0.08 / k));
    }
    surface.set_blend(Blend::Normal);
    surface.circle(center, pulse, core.with_alpha(0.55));

    surface.set_blend(Blend::Additive);
    let overlay = frame.color(t * 0.1 + 5.0);
    for i in 0..OVERLAY_RINGS {
        let k = 1.0 - i as f32 / OVERLAY_RINGS as f32;
        surface.circle(center, reach * k, overlay.with_alpha(0.025));
    }
    surface.set_blend(Blend::Normal);
}

/// Spectrum value for blob vertex `i`, mirrored so the seam at angle 0 is
/// continuous and averaged over neighbouring bins
fn smoothed_spectrum(spectrum: &[f32], i: usize) -> f32 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let f = i as f32 / BLOB_POINTS as f32;
    let mirrored = 1.0 - (2.0 * f - 1.0).abs();
    let last = spectrum.len() - 1;
    let idx = (mirrored * last as f32).round() as usize;
    let lo = idx.saturating_sub(SPECTRUM_SMOOTHING);
    let hi = (idx + SPECTRUM_SMOOTHING).min(last);
    let window = &spectrum[lo..=hi];
    window.iter().sum::<f32>() / window.len() as f32
}

/// Outline of the morph blob: a circle pushed outward by the spectrum and a
/// slowly turning sine term
pub fn blob_outline(center: Vec2, base_radius: f32, time: f32, spectrum: &[f32]) -> Vec<Vec2> {
    (0..BLOB_POINTS)
        .map(|i| {
            let theta = i as f32 / BLOB_POINTS as f32 * TAU;
            let s = smoothed_spectrum(spectrum, i).clamp(0.0, 1.0);
            let morph = 0.06 * (5.0 * theta + 1.7 * time).sin();
            let r = base_radius * (1.0 + 0.45 * s + morph);
            center + Vec2::new(theta.cos(), theta.sin()) * r
        })
        .collect()
}

/// Central blob with its glow. `drop_scale` is 1.0 except on bass-drop frames.
pub fn draw_blob(surface: &mut dyn Surface, frame: &SceneFrame, drop_scale: f32) {
    let vp = frame.viewport;
    let center = vp.center();
    let base = vp.min_half() * 0.28 * (1.0 + 0.3 * frame.amplitude) * drop_scale;
    let outline = blob_outline(center, base, frame.time, frame.spectrum);
    let color = frame.color(frame.time * 0.5 + 2.0);

    surface.set_blend(Blend::Additive);
    for pass in (1..=GLOW_PASSES).rev() {
        let grow = 1.0 + 0.07 * pass as f32;
        let glow: Vec<Vec2> = outline.iter().map(|&p| center + (p - center) * grow).collect();
        surface.polygon(&glow, color.with_alpha(0.1));
    }
    surface.set_blend(Blend::Normal);
    surface.polygon(&outline, color.with_alpha(0.85));
}

/// Waveform window as a horizontal line across the middle of the viewport.
/// Fewer than two samples give no points.
pub fn waveform_points(vp: Viewport, waveform: &[f32], gain: f32) -> Vec<Vec2> {
    if waveform.len() < 2 {
        return Vec::new();
    }
    let count = waveform.len().min(WAVEFORM_POINTS);
    let scale = vp.h * 0.2 * gain.clamp(0.0, 1.0);
    (0..count)
        .map(|j| {
            let sample = waveform[j * waveform.len() / count];
            let x = j as f32 / (count - 1) as f32 * vp.w;
            Vec2::new(x, vp.h * 0.5 + sample * scale)
        })
        .collect()
}

pub fn draw_waveform(surface: &mut dyn Surface, frame: &SceneFrame, waveform: &[f32], gain: f32) {
    let points = waveform_points(frame.viewport, waveform, gain);
    if points.is_empty() {
        return;
    }
    let color = frame.color(frame.time + 4.0);
    surface.set_blend(Blend::Additive);
    surface.polyline(&points, 6.0, color.with_alpha(0.2));
    surface.set_blend(Blend::Normal);
    surface.polyline(&points, 2.0, color.with_alpha(0.9));
}

/// One bar per spectrum bin along the bottom edge
pub fn draw_spectrum_bars(surface: &mut dyn Surface, frame: &SceneFrame) {
    if frame.spectrum.is_empty() {
        return;
    }
    let vp = frame.viewport;
    let n = frame.spectrum.len() as f32;
    let slot = vp.w / n;
    let max_height = vp.h * 0.22;

    surface.set_blend(Blend::Normal);
    for (i, &v) in frame.spectrum.iter().enumerate() {
        let v = v.clamp(0.0, 1.0);
        let height = v * max_height;
        if height <= 0.0 {
            continue;
        }
        let color = frame.color(frame.time + i as f32 / n * PALETTE_SIZE);
        surface.rect(
            Vec2::new(i as f32 * slot + slot * 0.1, vp.h - height),
            Vec2::new(slot * 0.8, height),
            color.with_alpha(0.5 + 0.5 * v),
        );
    }
}
