//! Per-track animation engine.
//!
//! A `Visualizer` owns everything that evolves from frame to frame: the
//! analysis cursor, detector history, clock, particles and shockwaves. It is
//! built once per loaded track and thrown away on the next one, which is the
//! only way any of that state gets reset.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::audio::{DetectorBank, FrameEvents, FrameExtractor, SpectralAnalyzer};
use crate::config::{AnalysisConfig, DetectionConfig};
use crate::draw::{Rgba, Surface};
use crate::track::AudioBuffer;
use crate::viewport::Viewport;
use crate::visual::color::{connotation_color, rotate_palette};
use crate::visual::particles::{ParticleField, ParticleKind};
use crate::visual::scene::{self, SceneFrame};
use crate::visual::shockwave::{Shockwave, ShockwaveField};
use crate::visual::state::{AnimationState, DT};

/// Running totals of detector triggers since the visualizer was created
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriggerCounts {
    pub beats: u64,
    pub bass_drops: u64,
    pub treble_bursts: u64,
    pub claps: u64,
}

impl TriggerCounts {
    fn record(&mut self, events: &FrameEvents) {
        self.beats += events.beat as u64;
        self.bass_drops += events.bass_drop as u64;
        self.treble_bursts += events.treble_burst as u64;
        self.claps += events.clap as u64;
    }
}

pub struct Visualizer<R: Rng = StdRng> {
    viewport: Viewport,
    frames: FrameExtractor,
    analyzer: SpectralAnalyzer,
    detectors: DetectorBank,
    state: AnimationState,
    particles: ParticleField,
    shockwaves: ShockwaveField,
    rng: R,
    triggers: TriggerCounts,
}

impl<R: Rng> Visualizer<R> {
    /// `track` may be `None`, in which case frames render the background only
    pub fn new(
        track: Option<Arc<AudioBuffer>>,
        viewport: Viewport,
        detection: &DetectionConfig,
        analysis: &AnalysisConfig,
        rng: R,
    ) -> Self {
        let window_size = analysis.window_size();
        let hop_length = analysis.hop_length();
        if let Some(track) = &track {
            log::debug!(
                "visualizer: {} samples @ {} Hz, window {} hop {}",
                track.len(),
                track.sample_rate(),
                window_size,
                hop_length
            );
        }

        Self {
            viewport,
            frames: FrameExtractor::new(track, window_size, hop_length),
            analyzer: SpectralAnalyzer::new(window_size, hop_length),
            detectors: DetectorBank::new(detection),
            state: AnimationState::new(DT),
            particles: ParticleField::new(),
            shockwaves: ShockwaveField::new(),
            rng,
            triggers: TriggerCounts::default(),
        }
    }

    /// Recompute layout for a new surface size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        log::debug!("visualizer viewport {}x{}", self.viewport.w, self.viewport.h);
    }

    /// Advance every piece of state by one fixed timestep and paint the frame.
    ///
    /// Order: waveform, spectrum, detectors, state transition, spawns,
    /// integration, then painting (background, shockwaves, blob, waveform,
    /// bars, particles).
    pub fn advance_and_render(&mut self, surface: &mut dyn Surface) -> FrameEvents {
        let (w, h) = surface.size();
        if w >= 1.0 && h >= 1.0 && (w != self.viewport.w || h != self.viewport.h) {
            self.resize(w, h);
        }

        let Self {
            viewport,
            frames,
            analyzer,
            detectors,
            state,
            particles,
            shockwaves,
            rng,
            triggers,
        } = self;
        let vp = *viewport;
        let center = vp.center();
        let now = state.clock.elapsed();
        let dt = state.clock.dt();

        let waveform = frames.next_waveform();
        let spectrum = analyzer.analyze(waveform);
        let events = detectors.process(spectrum, waveform, now);
        state.apply(&events);
        triggers.record(&events);

        let mood = connotation_color(events.amplitude, spectrum);
        let colors = |phase: f32| -> (Rgba, Rgba) {
            (
                rotate_palette(mood, now + phase),
                rotate_palette(mood, now + phase + 1.0),
            )
        };

        if events.bass_drop {
            shockwaves.push(Shockwave::new(
                events.bass_energy,
                vp.half_diagonal(),
                rotate_palette(mood, now),
            ));
            let n = rng.random_range(40..=64);
            particles.spawn_normals(rng, n, center, colors(0.0));
            let n = rng.random_range(6..=10);
            particles.spawn_comets(rng, n, center, colors(2.0));
        }
        if events.beat {
            let n = rng.random_range(24..=40);
            particles.spawn_normals(rng, n, center, colors(1.0));
            let n = rng.random_range(3..=6);
            particles.spawn_orbits(rng, n, center, vp.min_half(), colors(3.0));
        }
        if events.treble_burst {
            let n = rng.random_range(16..=28);
            particles.spawn_starbursts(rng, n, center, colors(4.0));
        }

        shockwaves.step(dt);
        particles.step(dt, center, rng);

        let frame = SceneFrame {
            viewport: vp,
            time: now,
            amplitude: events.amplitude,
            spectrum,
            mood,
        };
        scene::draw_background(surface, &frame, state.beat_scale);
        shockwaves.draw(surface, center);
        scene::draw_blob(surface, &frame, state.drop_scale);
        scene::draw_waveform(surface, &frame, waveform, state.waveform_gain());
        scene::draw_spectrum_bars(surface, &frame);
        particles.draw(surface);

        state.clock.advance();
        events
    }

    pub fn has_track(&self) -> bool {
        self.frames.sample_rate().is_some()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Seconds on the visualizer clock
    pub fn elapsed(&self) -> f32 {
        self.state.clock.elapsed()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particle_count_of(&self, kind: ParticleKind) -> usize {
        self.particles.count(kind)
    }

    pub fn shockwave_count(&self) -> usize {
        self.shockwaves.len()
    }

    pub fn triggers(&self) -> TriggerCounts {
        self.triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::recording::RecordingSurface;
    use rand::SeedableRng;
    use std::f32::consts::PI;

    const RATE: u32 = 44_100;

    fn visualizer(samples: Vec<f32>, seed: u64) -> Visualizer<StdRng> {
        let track = AudioBuffer::new(samples, RATE).map(Arc::new).ok();
        Visualizer::new(
            track,
            Viewport::new(800.0, 600.0),
            &DetectionConfig::default(),
            &AnalysisConfig::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    /// 50 ms of band-limited (20 Hz - 2 kHz) noise at `start_secs`:
    /// Schroeder phases, a 2 ms raised-cosine attack so the first window that
    /// reaches the burst already sees it at full level, and a 10 ms release
    fn low_burst(total_secs: f32, start_secs: f32) -> Vec<f32> {
        let mut samples = vec![0.0f32; (total_secs * RATE as f32) as usize];
        let start = (start_secs * RATE as f32) as usize;
        let len = (0.05 * RATE as f32) as usize;
        let attack = (0.002 * RATE as f32) as usize;
        let release = (0.010 * RATE as f32) as usize;
        let partials: Vec<f32> = (2..=200).map(|k| k as f32 * 10.0).collect();
        let count = partials.len() as f32;

        let ramp = |i: usize, n: usize| 0.5 - 0.5 * (PI * i as f32 / n as f32).cos();
        for n in 0..len {
            let t = n as f32 / RATE as f32;
            let envelope = if n < attack {
                ramp(n, attack)
            } else if n >= len - release {
                ramp(len - n, release)
            } else {
                1.0
            };
            let sum: f32 = partials
                .iter()
                .enumerate()
                .map(|(k, &f)| (2.0 * PI * f * t + PI * (k * k) as f32 / count).sin())
                .sum();
            samples[start + n] = sum * envelope;
        }

        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        samples.iter_mut().for_each(|s| *s *= 0.9 / peak);
        samples
    }

    #[test]
    fn test_silence_never_triggers() {
        let mut viz = visualizer(vec![0.0; 3 * RATE as usize], 7);
        let mut surface = RecordingSurface::new(800.0, 600.0);

        for _ in 0..180 {
            let events = viz.advance_and_render(&mut surface);
            assert!(!events.beat && !events.bass_drop && !events.treble_burst && !events.clap);
        }
        assert_eq!(viz.triggers(), TriggerCounts::default());
        assert_eq!(viz.particle_count(), 0);
        assert_eq!(viz.shockwave_count(), 0);
        assert!(!surface.saw_non_finite);
    }

    #[test]
    fn test_low_burst_fires_one_beat_and_one_drop() {
        let detection = DetectionConfig::default();
        let mut viz = visualizer(low_burst(3.0, 1.0), 11);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut trigger_frames = Vec::new();

        for frame in 0..200 {
            let events = viz.advance_and_render(&mut surface);
            if !(events.beat || events.bass_drop) {
                continue;
            }
            trigger_frames.push(frame);

            // Both fire off the same rise from silence
            assert!(events.beat && events.bass_drop, "frame {}: {:?}", frame, events);
            assert!(events.bass_energy > detection.drop_rise_threshold());
            assert_eq!(viz.shockwave_count(), 1);

            // Drop: 40..=64 normals + 6..=10 comets, beat: 24..=40 normals + 3..=6 orbits
            assert!((64..=104).contains(&viz.particle_count_of(ParticleKind::Normal)));
            assert!((6..=10).contains(&viz.particle_count_of(ParticleKind::Comet)));
            assert!((3..=6).contains(&viz.particle_count_of(ParticleKind::Orbit)));
        }

        // The burst reaches the analysis window around 1.0 s (frame ~83 at 512 hop)
        assert_eq!(trigger_frames.len(), 1, "triggered at {:?}", trigger_frames);
        assert!((80..=92).contains(&trigger_frames[0]));

        // Nothing else for the 200 frames, so in particular none within the
        // 0.7 s (42 frame) drop cooldown that follows
        let triggers = viz.triggers();
        assert_eq!(triggers.beats, 1);
        assert_eq!(triggers.bass_drops, 1);
        assert!(!surface.saw_non_finite);
    }

    #[test]
    fn test_no_triggers_during_drop_cooldown() {
        let mut viz = visualizer(low_burst(3.0, 1.0), 5);
        let mut surface = RecordingSurface::new(800.0, 600.0);

        let mut first = None;
        for frame in 0..200 {
            let events = viz.advance_and_render(&mut surface);
            if events.bass_drop {
                first = Some(frame);
                break;
            }
        }
        let first = first.expect("burst never produced a bass drop");

        for frame in first + 1..=first + 42 {
            let events = viz.advance_and_render(&mut surface);
            assert!(!events.beat && !events.bass_drop, "retrigger at frame {}", frame);
        }
    }

    #[test]
    fn test_everything_settles_after_burst() {
        let mut viz = visualizer(low_burst(6.0, 1.0), 3);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        for _ in 0..400 {
            viz.advance_and_render(&mut surface);
        }
        // Longest life is the orbit's 3.5 s; the burst is long gone by now
        assert_eq!(viz.particle_count(), 0);
        assert_eq!(viz.shockwave_count(), 0);
        assert!((viz.state().beat_scale - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_track_still_renders_background() {
        let mut viz: Visualizer = Visualizer::new(
            None,
            Viewport::default(),
            &DetectionConfig::default(),
            &AnalysisConfig::default(),
            StdRng::seed_from_u64(0),
        );
        let mut surface = RecordingSurface::new(1280.0, 720.0);
        let events = viz.advance_and_render(&mut surface);

        assert!(!viz.has_track());
        assert_eq!(events, FrameEvents::default());
        assert!(!surface.calls.is_empty());
        assert_eq!(viz.elapsed(), 1.0 / 60.0);
    }

    #[test]
    fn test_viewport_follows_surface() {
        let mut viz = visualizer(vec![0.0; 4096], 1);
        viz.resize(640.0, 480.0);
        assert_eq!(viz.viewport().center(), glam::Vec2::new(320.0, 240.0));

        let mut surface = RecordingSurface::new(1024.0, 768.0);
        viz.advance_and_render(&mut surface);
        assert_eq!(viz.viewport(), Viewport::new(1024.0, 768.0));
    }
}
