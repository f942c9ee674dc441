//! Musical event detection on top of the per-frame spectrum.
//!
//! Beat, bass drop and treble burst are rising-edge detectors: they fire when
//! a sub-band's energy rises by more than a threshold since the previous
//! frame (not against a long-run baseline), optionally gated by a cooldown.
//! Clap is an instantaneous level check with no memory at all.

use crate::config::DetectionConfig;

/// Fractional slices of the spectrum index range
pub mod bands {
    /// Beat / bass-drop band
    pub const KICK: (f32, f32) = (0.0, 0.10);
    /// Treble-burst tail
    pub const TREBLE_TAIL: (f32, f32) = (0.80, 1.0);
    /// Clap high-frequency band
    pub const CLAP: (f32, f32) = (0.70, 1.0);
    /// Color-mapper bands
    pub const BASS: (f32, f32) = (0.0, 0.15);
    pub const MID: (f32, f32) = (0.15, 0.50);
    pub const TREBLE: (f32, f32) = (0.50, 1.0);
}

/// Mean of `spectrum[len*lo .. len*hi]`, 0.0 for an empty slice
pub fn band_mean(spectrum: &[f32], (lo, hi): (f32, f32)) -> f32 {
    let len = spectrum.len() as f32;
    let start = ((len * lo) as usize).min(spectrum.len());
    let end = ((len * hi) as usize).min(spectrum.len());
    if end <= start {
        return 0.0;
    }
    spectrum[start..end].iter().sum::<f32>() / (end - start) as f32
}

/// Mean absolute sample value, 0.0 for an empty window. Summed in f64 so a
/// full window of a constant level comes back as that level.
pub fn amplitude(waveform: &[f32]) -> f32 {
    if waveform.is_empty() {
        return 0.0;
    }
    let sum: f64 = waveform.iter().map(|s| s.abs() as f64).sum();
    (sum / waveform.len() as f64) as f32
}

/// Everything the animation engine needs to know about one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameEvents {
    /// Bass rose sharply (short cooldown)
    pub beat: bool,
    /// Bass rose very sharply (long cooldown)
    pub bass_drop: bool,
    /// Top of the spectrum rose sharply
    pub treble_burst: bool,
    /// Loud frame with strong high frequencies
    pub clap: bool,

    /// Mean absolute sample value of the waveform window
    pub amplitude: f32,
    /// Mean of the lowest 10% of the spectrum
    pub bass_energy: f32,
    /// Mean of the top 20% of the spectrum
    pub treble_energy: f32,
    /// Mean of the top 30% of the spectrum
    pub high_energy: f32,
}

/// Frame-over-frame rise detector with optional cooldown
#[derive(Clone, Debug)]
pub struct RiseDetector {
    prev_energy: f32,
    last_trigger: Option<f32>,
    rise_threshold: f32,
    cooldown: Option<f32>,
}

impl RiseDetector {
    pub fn new(rise_threshold: f32, cooldown: Option<f32>) -> Self {
        Self {
            prev_energy: 0.0,
            last_trigger: None,
            rise_threshold,
            cooldown,
        }
    }

    /// Feed this frame's energy at time `now` (seconds). The previous energy is
    /// replaced on every call, whether or not the detector fires.
    pub fn update(&mut self, energy: f32, now: f32) -> bool {
        let rise = energy - self.prev_energy;
        self.prev_energy = energy;

        let cooled = match (self.cooldown, self.last_trigger) {
            (Some(cooldown), Some(last)) => now - last > cooldown,
            _ => true,
        };

        if rise > self.rise_threshold && cooled {
            self.last_trigger = Some(now);
            true
        } else {
            false
        }
    }

    pub fn previous_energy(&self) -> f32 {
        self.prev_energy
    }

    pub fn last_trigger(&self) -> Option<f32> {
        self.last_trigger
    }
}

/// Instantaneous loud-and-bright check
#[derive(Clone, Debug)]
pub struct ClapDetector {
    amplitude_threshold: f32,
    high_energy_threshold: f32,
}

impl ClapDetector {
    pub fn new(amplitude_threshold: f32, high_energy_threshold: f32) -> Self {
        Self {
            amplitude_threshold,
            high_energy_threshold,
        }
    }

    pub fn detect(&self, amplitude: f32, high_energy: f32) -> bool {
        amplitude > self.amplitude_threshold && high_energy > self.high_energy_threshold
    }
}

/// All detectors with their trailing state. Lives as long as one track.
#[derive(Clone, Debug)]
pub struct DetectorBank {
    beat: RiseDetector,
    bass_drop: RiseDetector,
    treble_burst: RiseDetector,
    clap: ClapDetector,
}

impl DetectorBank {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            beat: RiseDetector::new(config.beat_rise_threshold(), Some(config.beat_cooldown_secs())),
            bass_drop: RiseDetector::new(
                config.drop_rise_threshold(),
                Some(config.drop_cooldown_secs()),
            ),
            treble_burst: RiseDetector::new(config.treble_rise_threshold(), None),
            clap: ClapDetector::new(
                config.clap_amplitude_threshold(),
                config.clap_high_energy_threshold(),
            ),
        }
    }

    /// Run every detector once. Empty inputs count as zero energy.
    pub fn process(&mut self, spectrum: &[f32], waveform: &[f32], now: f32) -> FrameEvents {
        let amplitude = amplitude(waveform);
        let bass_energy = band_mean(spectrum, bands::KICK);
        let treble_energy = band_mean(spectrum, bands::TREBLE_TAIL);
        let high_energy = band_mean(spectrum, bands::CLAP);

        let events = FrameEvents {
            beat: self.beat.update(bass_energy, now),
            bass_drop: self.bass_drop.update(bass_energy, now),
            treble_burst: self.treble_burst.update(treble_energy, now),
            clap: self.clap.detect(amplitude, high_energy),
            amplitude,
            bass_energy,
            treble_energy,
            high_energy,
        };

        if events.bass_drop {
            log::debug!("bass drop at {:.2}s (bass {:.2})", now, bass_energy);
        } else if events.beat {
            log::trace!("beat at {:.2}s (bass {:.2})", now, bass_energy);
        }

        events
    }
}

impl Default for DetectorBank {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}
